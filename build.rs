use anyhow::Result;
use vergen::{vergen, Config};

fn main() -> Result<()> {
    // trigger recompilation when a new migration is added
    println!("cargo:rerun-if-changed=migrations");

    // Builds from a source archive have no git metadata, which only costs us
    // the Sentry release name.
    if let Err(error) = vergen(Config::default()) {
        println!("cargo:warning=Unable to emit build metadata: {}", error);
    }

    Ok(())
}
