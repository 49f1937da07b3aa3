//! Package command - copy a built artifact and write its compressed sidecar.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use easygif_provision::progress::format_bytes;
use easygif_provision::Output;

#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Built artifact to package
    #[arg(value_name = "SRC")]
    pub src: PathBuf,

    /// Destination path; the sidecar is written to DST.dfl
    #[arg(value_name = "DST")]
    pub dst: PathBuf,
}

pub fn execute(args: PackageArgs, output: &Output) -> Result<i32> {
    let packaged = easygif_provision::package(&args.src, &args.dst)
        .with_context(|| format!("Failed to package {}", args.src.display()))?;

    output.success(&format!(
        "Packaged {} ({} -> {}, {:.1}%)",
        packaged.sidecar.display(),
        format_bytes(packaged.raw_len as f64),
        format_bytes(packaged.compressed_len as f64),
        packaged.ratio() * 100.0
    ));

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_command_writes_sidecar() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("easygif.node");
        std::fs::write(&src, vec![b'a'; 4096]).unwrap();
        let dst = temp.path().join("bin/x64-linux-easygif.node");

        let code = execute(
            PackageArgs {
                src,
                dst: dst.clone(),
            },
            &Output::default(),
        )
        .unwrap();

        assert_eq!(code, 0);
        assert!(dst.exists());
        assert!(easygif_provision::sidecar_path(&dst).exists());
    }

    #[test]
    fn test_package_command_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = execute(
            PackageArgs {
                src: temp.path().join("missing"),
                dst: temp.path().join("out"),
            },
            &Output::default(),
        )
        .unwrap_err();

        assert!(err.to_string().starts_with("Failed to package"));
    }
}
