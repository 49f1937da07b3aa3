/// End-to-end tests: package an artifact, publish it on a stub server and
/// provision it back into a binaries directory.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use easygif_provision::http::{FailureKind, OCTET_STREAM};
use easygif_provision::platform::{Arch, Os, Platform};
use easygif_provision::provision::{Component, PresenceState};
use easygif_provision::{package, Error, Output, ProvisionConfig, ProvisionPlan, Provisioner};
use httpmock::prelude::*;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn addon_bytes() -> Vec<u8> {
    b"\x7fELF easygif native addon "
        .iter()
        .cycle()
        .take(10 * 1024)
        .copied()
        .collect()
}

fn config(server: &MockServer, bin_dir: &Path, platform: Platform) -> ProvisionConfig {
    ProvisionConfig {
        bin_dir: bin_dir.to_path_buf(),
        release_url: server.base_url(),
        version: "1.0.0".to_string(),
        toolkit_url: Some(server.url("/ffmpeg.zip")),
        platform,
        system_path: false,
        progress: false,
        ..ProvisionConfig::default()
    }
}

/// Package the addon for `platform` and serve its sidecar at the release path.
fn publish_addon<'a>(server: &'a MockServer, work: &Path, platform: Platform) -> httpmock::Mock<'a> {
    let src = work.join("build/Release/easygif.node");
    fs::create_dir_all(src.parent().unwrap()).unwrap();
    fs::write(&src, addon_bytes()).unwrap();

    let name = platform.addon_binary_name();
    let packaged = package(&src, &work.join("dist").join(&name)).unwrap();
    assert!(packaged.compressed_len < packaged.raw_len);

    let sidecar = fs::read(&packaged.sidecar).unwrap();
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/releases/download/v1.0.0/{}.dfl", name));
        then.status(200)
            .header("content-type", OCTET_STREAM)
            .body(sidecar);
    })
}

fn publish_toolkit(server: &MockServer) -> httpmock::Mock<'_> {
    let root = "ffmpeg-master-latest-win64-gpl";
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    writer.start_file(format!("{}/README.txt", root), options).unwrap();
    writer.write_all(b"FFmpeg build").unwrap();
    writer.start_file(format!("{}/bin/ffmpeg.exe", root), options).unwrap();
    writer.write_all(&[0x4d; 8192]).unwrap();
    writer.start_file(format!("{}/bin/ffprobe.exe", root), options).unwrap();
    writer.write_all(&[0x5a; 4096]).unwrap();
    let archive = writer.finish().unwrap().into_inner();

    server.mock(|when, then| {
        when.method(GET).path("/ffmpeg.zip");
        then.status(200)
            .header("content-type", OCTET_STREAM)
            .body(archive);
    })
}

#[test]
fn test_packaged_addon_is_reproduced() {
    let server = MockServer::start();
    let work = TempDir::new().unwrap();
    let bin_dir = work.path().join("bin");
    let platform = Platform::new(Arch::X64, Os::Linux);

    fs::create_dir_all(&bin_dir).unwrap();
    fs::write(bin_dir.join("ffmpeg"), b"").unwrap();
    fs::write(bin_dir.join("ffprobe"), b"").unwrap();
    let sidecar = publish_addon(&server, work.path(), platform);

    let config = config(&server, &bin_dir, platform);
    let output = Output::default();
    let plan = ProvisionPlan::build(&config);
    assert_eq!(
        plan.status(Component::Toolkit).unwrap().state,
        PresenceState::Present
    );

    let report = Provisioner::new(&config, &output).unwrap().run(&plan).unwrap();

    sidecar.assert();
    let target = bin_dir.join("x64-linux-easygif.node");
    assert_eq!(report.installed, vec![Component::Addon]);
    assert_eq!(report.written, vec![target.clone()]);
    assert_eq!(fs::read(&target).unwrap(), addon_bytes());

    // A second run finds everything in place.
    assert!(ProvisionPlan::build(&config).is_satisfied());
}

#[test]
fn test_windows_toolkit_and_addon() {
    let server = MockServer::start();
    let work = TempDir::new().unwrap();
    let bin_dir = work.path().join("bin");
    let platform = Platform::new(Arch::X64, Os::Windows);

    let toolkit = publish_toolkit(&server);
    let addon = publish_addon(&server, work.path(), platform);

    let config = config(&server, &bin_dir, platform);
    let output = Output::default();
    let plan = ProvisionPlan::build(&config);
    let report = Provisioner::new(&config, &output).unwrap().run(&plan).unwrap();

    toolkit.assert();
    addon.assert();
    assert_eq!(report.installed, vec![Component::Toolkit, Component::Addon]);
    assert_eq!(fs::read(bin_dir.join("ffmpeg.exe")).unwrap(), vec![0x4d; 8192]);
    assert_eq!(fs::read(bin_dir.join("ffprobe.exe")).unwrap(), vec![0x5a; 4096]);
    assert_eq!(
        fs::read(bin_dir.join("x64-msvc-easygif.node")).unwrap(),
        addon_bytes()
    );
    assert!(!bin_dir.join("README.txt").exists());
}

#[test]
fn test_sidecar_behind_redirect() {
    let server = MockServer::start();
    let work = TempDir::new().unwrap();
    let bin_dir = work.path().join("bin");
    let platform = Platform::new(Arch::Arm64, Os::Linux);

    fs::create_dir_all(&bin_dir).unwrap();
    fs::write(bin_dir.join("ffmpeg"), b"").unwrap();
    fs::write(bin_dir.join("ffprobe"), b"").unwrap();
    publish_addon(&server, work.path(), platform);

    let mut config = config(&server, &bin_dir, platform);
    config.release_url = server.url("/mirror");
    server.mock(|when, then| {
        when.method(GET)
            .path("/mirror/releases/download/v1.0.0/arm64-linux-easygif.node.dfl");
        then.status(302)
            .header("location", "/releases/download/v1.0.0/arm64-linux-easygif.node.dfl");
    });

    let output = Output::default();
    let plan = ProvisionPlan::build(&config);
    Provisioner::new(&config, &output).unwrap().run(&plan).unwrap();

    assert_eq!(
        fs::read(bin_dir.join("arm64-linux-easygif.node")).unwrap(),
        addon_bytes()
    );
}

#[test]
fn test_failure_keeps_earlier_files() {
    let server = MockServer::start();
    let work = TempDir::new().unwrap();
    let bin_dir = work.path().join("bin");
    let platform = Platform::new(Arch::X64, Os::Windows);

    publish_toolkit(&server);
    server.mock(|when, then| {
        when.method(GET).path_contains("/releases/download/");
        then.status(404).body("Not Found");
    });

    let config = config(&server, &bin_dir, platform);
    let output = Output::default();
    let plan = ProvisionPlan::build(&config);
    let err = Provisioner::new(&config, &output).unwrap().run(&plan).unwrap_err();

    match err {
        Error::Download { source, .. } => assert_eq!(source.kind(), FailureKind::InvalidResponse),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(bin_dir.join("ffmpeg.exe").exists());
    assert!(bin_dir.join("ffprobe.exe").exists());
    assert!(!bin_dir.join("x64-msvc-easygif.node").exists());
}

#[test]
fn test_corrupt_sidecar_is_codec_error() {
    let server = MockServer::start();
    let work = TempDir::new().unwrap();
    let bin_dir = work.path().join("bin");
    let platform = Platform::new(Arch::X64, Os::Linux);

    fs::create_dir_all(&bin_dir).unwrap();
    fs::write(bin_dir.join("ffmpeg"), b"").unwrap();
    fs::write(bin_dir.join("ffprobe"), b"").unwrap();
    server.mock(|when, then| {
        when.method(GET)
            .path("/releases/download/v1.0.0/x64-linux-easygif.node.dfl");
        then.status(200)
            .header("content-type", OCTET_STREAM)
            .body([0xffu8; 16]);
    });

    let config = config(&server, &bin_dir, platform);
    let output = Output::default();
    let plan = ProvisionPlan::build(&config);
    let err = Provisioner::new(&config, &output).unwrap().run(&plan).unwrap_err();

    assert!(matches!(err, Error::Codec { .. }));
    assert!(!bin_dir.join("x64-linux-easygif.node").exists());
}
