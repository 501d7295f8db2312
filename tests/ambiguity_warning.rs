use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use ndarray::Array2;

use rusty_mvpa::{AttrValue, CollectionKind, Dataset};

/// Collects warnings emitted through the `log` facade.
struct WarningSink {
    messages: Mutex<Vec<String>>,
}

impl Log for WarningSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut messages) = self.messages.lock() {
                messages.push(record.args().to_string());
            }
        }
    }

    fn flush(&self) {}
}

static SINK: WarningSink = WarningSink {
    messages: Mutex::new(Vec::new()),
};

fn install() {
    // a second install from another test in this binary is a no-op
    let _ = log::set_logger(&SINK);
    log::set_max_level(LevelFilter::Warn);
}

fn warnings_about(name: &str) -> Vec<String> {
    let quoted = format!("'{name}'");
    SINK.messages
        .lock()
        .map(|m| m.iter().filter(|msg| msg.contains(&quoted)).cloned().collect())
        .unwrap_or_default()
}

fn dataset() -> Dataset {
    let mut ds = Dataset::from_dense(Array2::<f64>::zeros((2, 3)).into_dyn()).unwrap();
    ds.sa_mut().set("onset", vec![0, 1]).unwrap();
    ds.fa_mut().set("onset", vec![0, 1, 2]).unwrap();
    ds.sa_mut().set("subject", vec!["s1", "s2"]).unwrap();
    ds.a_mut().set("unit", AttrValue::from("mV")).unwrap();
    ds
}

#[test]
fn ambiguous_name_logs_a_warning_and_still_resolves() {
    install();
    let ds = dataset();
    let res = ds.find_collection("onset").unwrap();
    assert_eq!(res.kind, CollectionKind::Samples);
    assert_eq!(res.shadowed, vec![CollectionKind::Features]);

    let warnings = warnings_about("onset");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("'sa'"));
}

#[test]
fn unique_name_logs_nothing() {
    install();
    let ds = dataset();
    assert_eq!(ds.find_collection("subject").unwrap().kind, CollectionKind::Samples);
    assert_eq!(ds.find_collection("unit").unwrap().kind, CollectionKind::Dataset);
    assert!(ds.find_collection("unit").unwrap().shadowed.is_empty());
    assert!(warnings_about("subject").is_empty());
    assert!(warnings_about("unit").is_empty());
}

#[test]
fn explicit_prefix_skips_the_search() {
    install();
    let mut ds = dataset();
    ds.a_mut().set("explicit", AttrValue::from(1)).unwrap();
    ds.sa_mut().set("explicit", vec![1, 2]).unwrap();
    let (value, collection) = ds.get_attr("a.explicit").unwrap();
    assert_eq!(collection.kind(), CollectionKind::Dataset);
    assert!(value.as_array().is_none());
    assert!(warnings_about("explicit").is_empty());
}
