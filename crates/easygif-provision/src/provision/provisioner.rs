//! Fetch, decode and write whatever the plan says is absent.

use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::ArchiveScanner;
use crate::codec;
use crate::config::ProvisionConfig;
use crate::error::{Error, Result};
use crate::http::{Downloader, FailureKind};
use crate::output::Output;
use crate::progress::{NoProgress, ProgressPanel, ProgressSink};

use super::plan::{Component, ComponentStatus, ProvisionPlan, Remedy};

/// What a run wrote to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub installed: Vec<Component>,
    pub written: Vec<PathBuf>,
}

impl ProvisionReport {
    pub fn is_noop(&self) -> bool {
        self.installed.is_empty()
    }
}

pub struct Provisioner<'a> {
    config: &'a ProvisionConfig,
    downloader: Downloader,
    output: &'a Output,
}

impl<'a> Provisioner<'a> {
    pub fn new(config: &'a ProvisionConfig, output: &'a Output) -> Result<Self> {
        let downloader = Downloader::with_config(&config.download).map_err(|source| Error::Download {
            what: "release assets".to_string(),
            source,
        })?;

        Ok(Self {
            config,
            downloader,
            output,
        })
    }

    /// Provision every absent component in plan order.
    ///
    /// The first failure ends the run; files written before it stay on disk.
    pub fn run(&self, plan: &ProvisionPlan) -> Result<ProvisionReport> {
        let mut report = ProvisionReport::default();

        for status in &plan.components {
            let Some(problem) = status.problem() else {
                self.output
                    .verbose(&format!("{} already present", status.component));
                continue;
            };

            match status.component {
                Component::Toolkit => self.output.warn(&problem),
                Component::Addon => self.output.info(&problem),
            }

            let written = self.provision(plan, status)?;
            self.output.info(&format!("{} downloaded", status.component));

            report.installed.push(status.component);
            report.written.extend(written);
        }

        self.output.success("Installation complete");
        Ok(report)
    }

    fn provision(&self, plan: &ProvisionPlan, status: &ComponentStatus) -> Result<Vec<PathBuf>> {
        match &status.remedy {
            Remedy::Manual => Err(Error::NotAutoProvisionable {
                platform: plan.platform.to_string(),
            }),
            Remedy::FetchArchive {
                url,
                entries,
                target_dir,
            } => {
                self.output.info("Downloading the latest binaries");
                self.fetch_archive(status.component, url, entries, target_dir)
            }
            Remedy::FetchSidecar { url, target } => {
                self.output.info("Downloading corresponding binaries");
                self.fetch_sidecar(status.component, url, target)
                    .map(|path| vec![path])
            }
        }
    }

    fn fetch_archive(
        &self,
        component: Component,
        url: &str,
        entries: &[String],
        target_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let archive = self.download(component, url)?;

        let found = ArchiveScanner::new(entries.iter().cloned()).extract(&archive)?;
        drop(archive);

        create_dir(target_dir)?;

        let mut written = Vec::with_capacity(found.len());
        for entry in found.values() {
            let bytes = entry.decode().map_err(|source| Error::Codec {
                what: entry.name.clone(),
                source,
            })?;

            let path = target_dir.join(entry.file_name());
            write_file(&path, &bytes)?;
            written.push(path);
        }

        Ok(written)
    }

    fn fetch_sidecar(&self, component: Component, url: &str, target: &Path) -> Result<PathBuf> {
        let sidecar = self.download(component, url).inspect_err(|e| {
            if matches!(e, Error::Download { source, .. } if source.kind() == FailureKind::InvalidResponse)
            {
                self.output.error("No available binaries were found");
            }
        })?;

        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }

        let bytes = codec::decompress(&sidecar).map_err(|source| Error::Codec {
            what: url.to_string(),
            source,
        })?;

        write_file(target, &bytes)?;
        Ok(target.to_path_buf())
    }

    fn download(&self, component: Component, url: &str) -> Result<Vec<u8>> {
        let mut sink = self.progress_sink();
        self.downloader
            .fetch(url, sink.as_mut())
            .map_err(|source| Error::Download {
                what: component.label().to_string(),
                source,
            })
    }

    fn progress_sink(&self) -> Box<dyn ProgressSink> {
        if self.config.progress {
            let terminal = self.config.terminal;
            Box::new(ProgressPanel::for_terminal(terminal.ansi, terminal.columns))
        } else {
            Box::new(NoProgress)
        }
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
