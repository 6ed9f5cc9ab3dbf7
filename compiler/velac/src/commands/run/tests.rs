#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn parse(args: &[&str]) -> Result<RunArgs, String> {
    let args: Vec<String> = args.iter().map(|&a| a.to_owned()).collect();
    RunArgs::parse(&args)
}

#[test]
fn reads_every_option() {
    let run = parse(&[
        "report.vela",
        "--arg",
        "limit=10",
        "--arg",
        "name='a=b'",
        "--timeout",
        "250",
        "--max-rows",
        "7",
        "--using",
        "Shop",
        "--trace-tree",
    ])
    .unwrap();
    assert_eq!(
        run,
        RunArgs {
            path: "report.vela".to_owned(),
            args: vec![
                ("limit".to_owned(), "10".to_owned()),
                ("name".to_owned(), "'a=b'".to_owned()),
            ],
            timeout: Some(Duration::from_millis(250)),
            max_rows: Some(7),
            usings: vec!["Shop".to_owned()],
        }
    );
    let options = run.options();
    assert_eq!(options.maximum_rows, 7);
    assert_eq!(options.default_usings, vec!["System".to_owned(), "Shop".to_owned()]);
}

#[test]
fn defaults_apply_without_options() {
    let run = parse(&["a.vela"]).unwrap();
    assert_eq!(run.options(), ProcessorOptions::default());
}

#[test]
fn malformed_command_lines_are_rejected() {
    assert_eq!(parse(&[]).unwrap_err(), "missing file path");
    assert_eq!(
        parse(&["a.vela", "--arg", "x"]).unwrap_err(),
        "expected `name=literal`, found `x`"
    );
    assert_eq!(parse(&["a.vela", "--timeout"]).unwrap_err(), "`--timeout` needs a value");
    assert_eq!(parse(&["a.vela", "--bogus"]).unwrap_err(), "unknown option `--bogus`");
    assert_eq!(parse(&["a.vela", "b.vela"]).unwrap_err(), "unexpected argument `b.vela`");
}
