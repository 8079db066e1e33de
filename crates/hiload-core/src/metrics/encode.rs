//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write;

use super::{is_valid_metric_name, MetricDesc, MetricFamily, MetricKind, Sample, SampleValue};
use crate::error::{HiloadError, Result};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Float rendering understood by Prometheus parsers (`+Inf`, `-Inf`, `NaN`).
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

fn format_value(v: SampleValue) -> String {
    match v {
        SampleValue::Unsigned(n) => n.to_string(),
        SampleValue::Signed(n) => n.to_string(),
        SampleValue::Float(f) => format_float(f),
    }
}

/// Label name appended after the schema labels for this sample, if any.
fn extra_label(kind: MetricKind, suffix: &str) -> Option<Option<&'static str>> {
    match (kind, suffix) {
        (MetricKind::Counter, "") | (MetricKind::Gauge, "") => Some(None),
        (MetricKind::Histogram, "_bucket") => Some(Some("le")),
        (MetricKind::Histogram, "_sum" | "_count") => Some(None),
        (MetricKind::Summary, "") => Some(Some("quantile")),
        (MetricKind::Summary, "_sum" | "_count") => Some(None),
        _ => None,
    }
}

/// Check that a sample is consistent with the definition it was collected under.
fn check_sample(desc: &MetricDesc, s: &Sample) -> Result<()> {
    let Some(extra) = extra_label(desc.kind, s.suffix) else {
        return Err(HiloadError::Exposition(format!(
            "{}: suffix {:?} not valid for {}",
            desc.name,
            s.suffix,
            desc.kind.as_str()
        )));
    };
    let expected = desc.labels.len() + usize::from(extra.is_some());
    let schema_ok = s.labels.len() == expected
        && desc
            .labels
            .iter()
            .zip(s.labels.iter())
            .all(|(want, (got, _))| want == got);
    let extra_ok = match extra {
        Some(name) => s.labels.last().map(|(k, _)| k.as_str()) == Some(name),
        None => true,
    };
    if !(schema_ok && extra_ok) {
        return Err(HiloadError::Exposition(format!(
            "{}: sample labels do not match schema {:?}",
            desc.name, desc.labels
        )));
    }
    Ok(())
}

fn write_family(out: &mut String, fam: &MetricFamily) -> std::fmt::Result {
    let name = &fam.desc.name;
    writeln!(out, "# HELP {} {}", name, escape_help(&fam.desc.help))?;
    writeln!(out, "# TYPE {} {}", name, fam.desc.kind.as_str())?;
    for s in &fam.samples {
        out.push_str(name);
        out.push_str(s.suffix);
        if !s.labels.is_empty() {
            let label_str = s
                .labels
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");
            write!(out, "{{{}}}", label_str)?;
        }
        writeln!(out, " {}", format_value(s.value))?;
    }
    Ok(())
}

/// Render families in Prometheus text exposition format.
pub fn encode_text<I>(families: I) -> Result<String>
where
    I: IntoIterator<Item = MetricFamily>,
{
    let mut out = String::new();
    for fam in families {
        if !is_valid_metric_name(&fam.desc.name) {
            return Err(HiloadError::Exposition(format!(
                "invalid metric name {:?}",
                fam.desc.name
            )));
        }
        for s in &fam.samples {
            check_sample(&fam.desc, s)?;
        }
        write_family(&mut out, &fam)
            .map_err(|e| HiloadError::Exposition(format!("{}: {e}", fam.desc.name)))?;
    }
    Ok(out)
}
