use std::env;

fn main() -> nih_plug_xtask::Result<()> {
    let args: Vec<String> = env::args().collect();
    if let Some(dir) = target_dir(&args) {
        env::set_var("CARGO_TARGET_DIR", dir);
    }

    // `--target` stays on the command line, the bundler needs it too
    nih_plug_xtask::main()
}

/// `--target <triple>` builds go to their own `target/<triple>` directory.
fn target_dir(args: &[String]) -> Option<String> {
    let pos = args.iter().position(|arg| arg == "--target")?;
    args.get(pos + 1).map(|triple| format!("target/{triple}"))
}
