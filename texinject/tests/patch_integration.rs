//! Integration tests for the scan → encode → convert → patch flow.
//!
//! These tests run the patcher against real container files on disk:
//! - stub converters implementing `TextureConverter`
//! - the shell converter driving a script in place of the platform compiler
//! - companion-file staging after a patch run
//!
//! Run with: `cargo test --test patch_integration`

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use texinject::converter::{ConversionError, TextureConverter, GNF_HEADER_SIZE};
use texinject::dds::DDS_FILE_HEADER_LEN;
use texinject::patcher::{
    InPlaceTexturePatcher, OverflowPolicy, PatchObserver, PatcherConfig, RecordOutcome,
    RecordStatus, SkipReason,
};
use texinject::scanner::scan_records;
use texinject::staging::stage_companion_files;
use texinject::texture::TextureFormat;

// ============================================================================
// Helper Functions
// ============================================================================

const FILLER: u8 = 0xEE;

/// Layout of one synthetic record: sentinel at `start`, dimensions at +244,
/// name length at +256, name at +260, payload at +292+name.
struct Fixture {
    start: usize,
    width: u32,
    height: u32,
    tag: &'static str,
}

impl Fixture {
    fn payload_offset(&self) -> usize {
        self.start + 292 + self.tag.len()
    }

    fn payload_len(&self) -> usize {
        let bpp = match self.tag {
            "PF_B8G8R8A8" => 4,
            _ => 1,
        };
        self.width as usize * self.height as usize * bpp
    }

    fn payload_end(&self) -> usize {
        self.payload_offset() + self.payload_len()
    }
}

/// Build container bytes holding `fixtures` plus `tail` filler bytes.
fn container(fixtures: &[Fixture], tail: usize) -> Vec<u8> {
    let len = fixtures.iter().map(Fixture::payload_end).max().unwrap_or(0) + tail;
    let mut data = vec![FILLER; len];

    for f in fixtures {
        data[f.start..f.start + 4].fill(0);
        data[f.start + 244..f.start + 248].copy_from_slice(&f.width.to_le_bytes());
        data[f.start + 248..f.start + 252].copy_from_slice(&f.height.to_le_bytes());
        data[f.start + 256..f.start + 260].copy_from_slice(&(f.tag.len() as u32).to_le_bytes());
        data[f.start + 260..f.start + 260 + f.tag.len()].copy_from_slice(f.tag.as_bytes());
        for (i, byte) in data[f.payload_offset()..f.payload_end()].iter_mut().enumerate() {
            *byte = (i % 250) as u8 + 1;
        }
    }

    data
}

fn write_container(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Converter that XORs every payload byte with a key.
struct XorConverter(u8);

impl TextureConverter for XorConverter {
    fn convert(&self, input: &Path) -> Result<PathBuf, ConversionError> {
        let dds = fs::read(input).unwrap();
        let mut out = vec![0u8; GNF_HEADER_SIZE];
        out.extend(dds[DDS_FILE_HEADER_LEN..].iter().map(|b| b ^ self.0));
        let path = input.with_extension("gnf");
        fs::write(&path, out).unwrap();
        Ok(path)
    }

    fn name(&self) -> &str {
        "xor"
    }
}

/// Converter that fails for formats other than the one given.
struct OnlyFormat(TextureFormat);

impl TextureConverter for OnlyFormat {
    fn convert(&self, input: &Path) -> Result<PathBuf, ConversionError> {
        let dds = fs::read(input).unwrap();
        let bit_count = u32::from_le_bytes(dds[88..92].try_into().unwrap());
        let path = input.with_extension("gnf");
        if bit_count != self.0.bit_count() {
            return Err(ConversionError::MissingOutput { path });
        }
        let mut out = vec![0u8; GNF_HEADER_SIZE];
        out.extend_from_slice(&dds[DDS_FILE_HEADER_LEN..]);
        fs::write(&path, out).unwrap();
        Ok(path)
    }

    fn name(&self) -> &str {
        "only-format"
    }
}

#[derive(Default)]
struct Recorder {
    outcomes: Vec<(RecordOutcome, u64)>,
    finished: bool,
}

impl PatchObserver for Recorder {
    fn on_outcome(&mut self, outcome: &RecordOutcome, cursor: u64, _container_len: u64) {
        self.outcomes.push((outcome.clone(), cursor));
    }

    fn on_finished(&mut self, _report: &texinject::patcher::PatchReport) {
        self.finished = true;
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_patch_file_rewrites_every_record_in_place() {
    let temp = TempDir::new().unwrap();
    let fixtures = [
        Fixture { start: 16, width: 8, height: 8, tag: "PF_B8G8R8A8" },
        Fixture { start: 2048, width: 16, height: 16, tag: "PF_BC7" },
    ];
    let original = container(&fixtures, 128);
    let path = write_container(temp.path(), "pakchunk0.ucas", &original);

    let patcher = InPlaceTexturePatcher::new(XorConverter(0xFF), PatcherConfig::default());
    let mut recorder = Recorder::default();
    let report = patcher.patch_file_with_observer(&path, &mut recorder).unwrap();

    assert_eq!(report.found_count(), 2);
    assert_eq!(report.patched_count(), 2);
    assert!(recorder.finished);

    let patched = fs::read(&path).unwrap();
    assert_eq!(patched.len(), original.len());

    for (i, (before, after)) in original.iter().zip(&patched).enumerate() {
        let in_payload = fixtures
            .iter()
            .any(|f| (f.payload_offset()..f.payload_end()).contains(&i));
        if in_payload {
            assert_eq!(*after, before ^ 0xFF, "payload byte {} not rewritten", i);
        } else {
            assert_eq!(after, before, "byte {} outside payloads changed", i);
        }
    }
}

#[test]
fn test_failed_conversion_is_skipped_and_scan_continues() {
    let temp = TempDir::new().unwrap();
    let fixtures = [
        Fixture { start: 0, width: 8, height: 8, tag: "PF_B8G8R8A8" },
        Fixture { start: 1024, width: 8, height: 8, tag: "PF_BC7" },
    ];
    let original = container(&fixtures, 32);
    let path = write_container(temp.path(), "chunk.ucas", &original);

    let patcher = InPlaceTexturePatcher::new(OnlyFormat(TextureFormat::Bc7), PatcherConfig::default());
    let mut recorder = Recorder::default();
    let report = patcher.patch_file_with_observer(&path, &mut recorder).unwrap();

    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.patched_count(), 1);

    let (first, cursor) = &recorder.outcomes[0];
    assert!(matches!(
        first.status,
        RecordStatus::Skipped(SkipReason::ConversionFailed(_))
    ));
    assert_eq!(*cursor, fixtures[0].payload_end() as u64 + 1);

    // Identity for the BC7 record, untouched for the failed one.
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn test_unrecognised_tag_is_ignored() {
    let fixtures = [
        Fixture { start: 100, width: 8, height: 8, tag: "PF_RGBA16" },
        Fixture { start: 1200, width: 4, height: 4, tag: "PF_B8G8R8A8" },
    ];
    let data = container(&fixtures, 16);

    let records = scan_records(&mut std::io::Cursor::new(data)).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record_start, 1200);
    assert_eq!(records[0].format, TextureFormat::Bgra8);
}

#[test]
fn test_truncate_policy_bounds_overflowing_payload() {
    struct Grow;
    impl TextureConverter for Grow {
        fn convert(&self, input: &Path) -> Result<PathBuf, ConversionError> {
            let path = input.with_extension("gnf");
            fs::write(&path, vec![0x11u8; GNF_HEADER_SIZE + 4096]).unwrap();
            Ok(path)
        }
        fn name(&self) -> &str {
            "grow"
        }
    }

    let temp = TempDir::new().unwrap();
    let fixtures = [Fixture { start: 0, width: 4, height: 4, tag: "PF_B8G8R8A8" }];
    let original = container(&fixtures, 1000);
    let path = write_container(temp.path(), "grow.ucas", &original);

    let reject = InPlaceTexturePatcher::new(Grow, PatcherConfig::default());
    let report = reject.patch_file(&path).unwrap();
    assert_eq!(report.patched_count(), 0);
    assert_eq!(fs::read(&path).unwrap(), original);

    let truncate = InPlaceTexturePatcher::new(
        Grow,
        PatcherConfig::new().with_overflow_policy(OverflowPolicy::Truncate),
    );
    let report = truncate.patch_file(&path).unwrap();
    assert_eq!(report.truncated_count(), 1);

    let patched = fs::read(&path).unwrap();
    let f = &fixtures[0];
    assert!(patched[f.payload_offset()..f.payload_end()].iter().all(|&b| b == 0x11));
    assert_eq!(&patched[f.payload_end()..], &original[f.payload_end()..]);
}

#[test]
fn test_patch_then_stage_companions() {
    let temp = TempDir::new().unwrap();
    let fixtures = [Fixture { start: 0, width: 2, height: 2, tag: "PF_B8G8R8A8" }];
    let source = write_container(temp.path(), "pakchunk5.ucas", &container(&fixtures, 8));
    fs::write(temp.path().join("pakchunk5.utoc"), b"toc").unwrap();
    fs::write(temp.path().join("pakchunk5.pak"), b"pak").unwrap();

    let patcher = InPlaceTexturePatcher::new(XorConverter(0x0F), PatcherConfig::default());
    patcher.patch_file(&source).unwrap();

    let dest = temp.path().join("mods");
    let report = stage_companion_files(&source, &dest, "pakchunk5_P").unwrap();

    assert_eq!(report.copied.len(), 3);
    assert_eq!(
        fs::read(dest.join("pakchunk5_P.ucas")).unwrap(),
        fs::read(&source).unwrap()
    );
}

#[cfg(unix)]
#[test]
fn test_shell_converter_end_to_end() {
    use texinject::converter::OrbisImageConverter;

    let temp = TempDir::new().unwrap();
    let script = temp.path().join("fake-image2gnf.sh");
    // args: -f auto -i <in> -o <out>; emit a 256-byte header then the DDS payload.
    fs::write(
        &script,
        "head -c 256 /dev/zero > \"$6\"\ntail -c +129 \"$4\" >> \"$6\"\n",
    )
    .unwrap();

    let fixtures = [Fixture { start: 64, width: 4, height: 4, tag: "PF_B8G8R8A8" }];
    let original = container(&fixtures, 16);
    let path = write_container(temp.path(), "e2e.ucas", &original);

    let converter = OrbisImageConverter::new(&script).with_launcher("/bin/sh");
    let patcher = InPlaceTexturePatcher::new(converter, PatcherConfig::default());
    let report = patcher.patch_file(&path).unwrap();

    assert_eq!(report.patched_count(), 1);
    assert_eq!(report.bytes_written(), 64);
    assert_eq!(fs::read(&path).unwrap(), original);
}
