//! Backends command

use anyhow::Result;
use pixbench_compute::{describe_backends, detect_backends};

pub fn run(verbose: u8) -> Result<()> {
    print!("{}", describe_backends());

    if verbose > 0 {
        let available: Vec<_> = detect_backends()
            .into_iter()
            .filter(|b| b.available)
            .map(|b| b.kind.name())
            .collect();
        println!("Usable with -b: {}", available.join(", "));
    }
    Ok(())
}
