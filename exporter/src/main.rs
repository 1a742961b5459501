#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

use clap::Parser;

fn main() -> anyhow::Result<()> {
    role_exporter::Args::parse().run()
}
