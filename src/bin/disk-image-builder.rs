use std::path::Path;

use anyhow::{bail, Context, Result};
use disk_image_builder::{load_config, pipeline};

fn usage() -> &'static str {
    "Usage:\n  disk-image-builder <build-archive.zip>\n\n\
     Assembles sd.qcow2 and cf.qcow2 in the current directory from\n\
     ../sd.qcow2.xz and the given build archive, ready for emulation.\n\
     Expected to be called by the build system."
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [archive] => build(Path::new(archive)),
        _ => bail!(usage()),
    }
}

fn build(archive_path: &Path) -> Result<()> {
    if !archive_path.is_file() {
        bail!("Couldn't access build archive '{}'", archive_path.display());
    }

    let work_dir = std::env::current_dir().context("resolving current directory")?;
    let config = load_config(&work_dir)?;
    pipeline::run(&work_dir, archive_path, &config)
}
