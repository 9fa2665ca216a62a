use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;

use refscan::report::{OwnerFilter, render_report, report_entries};
use refscan::scan::{list_artifacts, scan_corpus};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "refscan_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> anyhow::Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(*name, options)?;
        writer.write_all(content)?;
    }
    Ok(writer.finish()?.into_inner())
}

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, zip_bytes(entries)?)?;
    Ok(())
}

/// Minimal class file whose pool holds one Methodref per (owner, member,
/// signature) triple.
fn class_with_method_refs(refs: &[(&str, &str, &str)]) -> Vec<u8> {
    fn push_u2(out: &mut Vec<u8>, value: u16) {
        out.extend_from_slice(&value.to_be_bytes());
    }
    fn push_utf8(out: &mut Vec<u8>, value: &str) {
        out.push(1);
        push_u2(out, value.len() as u16);
        out.extend_from_slice(value.as_bytes());
    }

    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    push_u2(&mut out, 0);
    push_u2(&mut out, 52);
    push_u2(&mut out, 1 + 6 * refs.len() as u16);
    for (i, (owner, member, signature)) in refs.iter().enumerate() {
        let base = (1 + 6 * i) as u16;
        push_utf8(&mut out, owner);
        out.push(7); // Class
        push_u2(&mut out, base);
        push_utf8(&mut out, member);
        push_utf8(&mut out, signature);
        out.push(12); // NameAndType
        push_u2(&mut out, base + 2);
        push_u2(&mut out, base + 3);
        out.push(10); // Methodref
        push_u2(&mut out, base + 1);
        push_u2(&mut out, base + 4);
    }
    out
}

fn run_pipeline(input: &Path, filter: &OwnerFilter) -> anyhow::Result<String> {
    let artifacts = list_artifacts(input)?;
    let outcome = scan_corpus(&artifacts);
    Ok(render_report(&report_entries(&outcome.tally, filter)))
}

#[test]
fn end_to_end_report_over_mixed_corpus() -> anyhow::Result<()> {
    let input = temp_dir("e2e_mixed");
    std::fs::create_dir_all(&input)?;

    // Class A calls foo twice, class B (inside a nested jar) calls it once.
    let class_a = class_with_method_refs(&[
        ("org/pkg/Api", "foo", "()V"),
        ("org/pkg/Api", "foo", "()V"),
    ]);
    let class_b = class_with_method_refs(&[("org/pkg/Api", "foo", "()V")]);
    let class_internal = class_with_method_refs(&[("org/pkg/internal/Impl", "bar", "()V")]);
    let nested = zip_bytes(&[("b/B.class", &class_b)])?;

    write_jar(
        &input.join("plugin.jar"),
        &[
            ("a/A.class", &class_a),
            ("lib/nested.jar", &nested),
            ("c/Internal.class", &class_internal),
            ("d/Garbage.class", b"not a class file"),
        ],
    )?;
    // A broken sibling artifact must not affect the report.
    std::fs::write(input.join("broken.jar"), b"not an archive")?;

    let filter = OwnerFilter::new("org/pkg", Some("org/pkg/internal"))?;

    let artifacts = list_artifacts(&input)?;
    let outcome = scan_corpus(&artifacts);
    assert_eq!(outcome.summary.artifacts_scanned, 1);
    assert_eq!(outcome.summary.artifacts_failed, 1);
    assert_eq!(outcome.summary.classes_parsed, 3);
    assert_eq!(outcome.summary.classes_skipped, 1);

    let report = render_report(&report_entries(&outcome.tally, &filter));
    assert_eq!(report, "3 org/pkg/Api.foo:()V\n");

    std::fs::remove_dir_all(input)?;
    Ok(())
}

#[test]
fn report_is_byte_identical_across_runs() -> anyhow::Result<()> {
    let input = temp_dir("e2e_determinism");
    std::fs::create_dir_all(&input)?;

    // Enough artifacts that rayon's scheduling actually interleaves.
    for i in 0..8 {
        let class = class_with_method_refs(&[
            ("org/pkg/Api", "foo", "()V"),
            ("org/pkg/Api", "bar", "(I)I"),
            (&format!("org/pkg/Only{i}"), "touch", "()V"),
        ]);
        write_jar(&input.join(format!("artifact{i}.jar")), &[("A.class", &class)])?;
    }

    let filter = OwnerFilter::new("org/pkg", None)?;
    let first = run_pipeline(&input, &filter)?;
    let second = run_pipeline(&input, &filter)?;
    assert_eq!(first, second);
    assert!(first.starts_with("8 org/pkg/Api.bar:(I)I\n8 org/pkg/Api.foo:()V\n"));

    std::fs::remove_dir_all(input)?;
    Ok(())
}
