//! The `check` command: compile a script and describe its interface.

use velac::{Processor, ProcessorOptions};

use super::{fail, read_file};

pub fn check_file(path: &str) {
    let source = read_file(path);
    let processor = Processor::builder().cache(false).build();
    let executable = match processor.prepare(&source, &ProcessorOptions::default()) {
        Ok(executable) => executable,
        Err(err) => fail(&err, &source, path),
    };

    println!("OK: {path} (result: {})", executable.result_type());
    for (name, ty) in executable.parameters() {
        println!("  var {name} : {ty}");
    }
    for target in executable.storage() {
        println!("  uses {target} : {}", target.ty);
    }
}
