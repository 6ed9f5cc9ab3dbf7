//! The `run` command.

use std::time::Duration;

use velac::{Arguments, Processor, ProcessorOptions, Value};

use super::{fail, read_file};

/// Parsed `vela run` command line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunArgs {
    pub path: String,
    /// `--arg name=literal`, in order.
    pub args: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub max_rows: Option<usize>,
    pub usings: Vec<String>,
}

impl RunArgs {
    pub fn parse(args: &[String]) -> Result<RunArgs, String> {
        let mut run = RunArgs::default();
        let mut path = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("`{flag}` needs a value"))
            };
            match arg.as_str() {
                "--arg" => {
                    let assignment = value("--arg")?;
                    let Some((name, literal)) = assignment.split_once('=') else {
                        return Err(format!("expected `name=literal`, found `{assignment}`"));
                    };
                    run.args.push((name.trim().to_owned(), literal.to_owned()));
                }
                "--timeout" => {
                    let millis = value("--timeout")?;
                    let millis: u64 = millis
                        .parse()
                        .map_err(|_| format!("invalid timeout `{millis}`"))?;
                    run.timeout = Some(Duration::from_millis(millis));
                }
                "--max-rows" => {
                    let rows = value("--max-rows")?;
                    run.max_rows =
                        Some(rows.parse().map_err(|_| format!("invalid row limit `{rows}`"))?);
                }
                "--using" => run.usings.push(value("--using")?),
                "--trace-tree" => {}
                flag if flag.starts_with("--") => return Err(format!("unknown option `{flag}`")),
                file if path.is_none() => path = Some(file.to_owned()),
                extra => return Err(format!("unexpected argument `{extra}`")),
            }
        }
        run.path = path.ok_or_else(|| "missing file path".to_owned())?;
        Ok(run)
    }

    fn options(&self) -> ProcessorOptions {
        let mut options = ProcessorOptions::default();
        if let Some(timeout) = self.timeout {
            options.maximum_time = timeout;
        }
        if let Some(rows) = self.max_rows {
            options.maximum_rows = rows;
        }
        options.default_usings.extend(self.usings.iter().cloned());
        options
    }
}

/// Evaluate a script file and print its result.
pub fn run_file(run: &RunArgs) {
    let source = read_file(&run.path);
    let processor = Processor::builder().build();

    // Argument literals are evaluated as scripts of their own.
    let mut arguments = Arguments::new();
    for (name, literal) in &run.args {
        match processor.evaluate(literal, &Arguments::new(), &ProcessorOptions::default()) {
            Ok(value) => arguments.insert(name, value),
            Err(err) => fail(&err, literal, &format!("--arg {name}")),
        }
    }

    match processor.evaluate(&source, &arguments, &run.options()) {
        Ok(Value::Void) => {}
        Ok(value) => println!("{value}"),
        Err(err) => fail(&err, &source, &run.path),
    }
}

#[cfg(test)]
mod tests;
