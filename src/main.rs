//! Atlasmesh - Command-line tool for converting sprite atlas exports into OBJ meshes

use std::process::ExitCode;

use atlasmesh::cli;

fn main() -> ExitCode {
    cli::run()
}
