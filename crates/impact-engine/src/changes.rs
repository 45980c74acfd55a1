//! The session facade: one baseline, many labelled variants.

use tracing::{debug, warn};

use impact_diff::{parse_markers, render_unified, split_lines, DiffSource, EditScript, LineDiffer};
use impact_types::Label;

use crate::config::SessionConfig;
use crate::error::{EngineError, EngineResult};
use crate::export::RawExport;
use crate::report::{build_rows, label_stats, LabelStat, ReportOptions, ReportRow};
use crate::state::FileState;

/// An analysis session over a single baseline.
///
/// Variants are added one at a time under a label; each is diffed against
/// the baseline and its per-line verdicts are appended to the session
/// state. A variant that fails to reconcile is rejected as a whole and the
/// session is left as it was.
pub struct Changes {
    name: String,
    baseline: Vec<String>,
    state: FileState,
    source: Box<dyn DiffSource>,
    config: SessionConfig,
}

impl std::fmt::Debug for Changes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Changes")
            .field("name", &self.name)
            .field("baseline", &self.baseline.len())
            .field("labels", &self.state.labels())
            .field("config", &self.config)
            .finish()
    }
}

impl Changes {
    /// Create a session with the default configuration.
    pub fn new<I, S>(name: impl Into<String>, baseline: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(name, baseline, SessionConfig::default())
    }

    /// Create a session from baseline text, keeping line terminators.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, split_lines(text))
    }

    /// Create a session with an explicit configuration.
    pub fn with_config<I, S>(name: impl Into<String>, baseline: I, config: SessionConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let baseline: Vec<String> = baseline.into_iter().map(Into::into).collect();
        debug!(
            name = %name,
            lines = baseline.len(),
            algorithm = ?config.algorithm,
            "session created"
        );
        Self {
            state: FileState::new(baseline.len()),
            source: Box::new(LineDiffer::new(config.algorithm)),
            name,
            baseline,
            config,
        }
    }

    /// Replace the diff source used by [`Changes::add_diff`].
    pub fn with_source(mut self, source: impl DiffSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The baseline lines, terminators included.
    pub fn baseline(&self) -> &[String] {
        &self.baseline
    }

    /// The baseline line at `index`.
    pub fn content_line(&self, index: usize) -> Option<&str> {
        self.baseline.get(index).map(String::as_str)
    }

    /// Number of baseline lines.
    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    pub fn state(&self) -> &FileState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Labels added so far, in order of first addition.
    pub fn labels(&self) -> &[Label] {
        self.state.labels()
    }

    fn baseline_refs(&self) -> Vec<&str> {
        self.baseline.iter().map(String::as_str).collect()
    }

    // ---------------------------------------------------------------
    // Adding variants
    // ---------------------------------------------------------------

    /// Diff `variant` against the baseline with the configured source and
    /// record it under `label`.
    ///
    /// Returns `true` if the variant differs from the baseline anywhere.
    pub fn add_diff<S: AsRef<str>>(&mut self, label: impl Into<Label>, variant: &[S]) -> EngineResult<bool> {
        let label = label.into();
        let variant: Vec<&str> = variant.iter().map(AsRef::as_ref).collect();
        let script = self
            .source
            .edit_script(&self.baseline_refs(), &variant)
            .map_err(|e| rejected(&label, e.into()))?;
        self.state.add_variant(label, &script)
    }

    /// Like [`Changes::add_diff`] for a variant given as one text.
    pub fn add_text(&mut self, label: impl Into<Label>, text: &str) -> EngineResult<bool> {
        self.add_diff(label, &split_lines(text))
    }

    /// Record a variant from an already computed edit script.
    pub fn parse_diff(&mut self, label: impl Into<Label>, script: &EditScript) -> EngineResult<bool> {
        self.state.add_variant(label, script)
    }

    /// Record a variant from zero-context unified diff text.
    pub fn parse_unified(&mut self, label: impl Into<Label>, text: &str) -> EngineResult<bool> {
        let label = label.into();
        let script =
            impact_diff::parse_unified(text, self.len()).map_err(|e| rejected(&label, e.into()))?;
        self.state.add_variant(label, &script)
    }

    /// Record a variant from an `ndiff`-style marker stream.
    pub fn add_markers<I, S>(&mut self, label: impl Into<Label>, tokens: I) -> EngineResult<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let label = label.into();
        let script = parse_markers(tokens).map_err(|e| rejected(&label, e.into()))?;
        self.state.add_variant(label, &script)
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Zero-context unified diff of `variant` against the baseline.
    ///
    /// Does not record anything. Empty when the variant is identical.
    pub fn unified_diff<S: AsRef<str>>(&self, label: &str, variant: &[S]) -> EngineResult<String> {
        let baseline = self.baseline_refs();
        let variant: Vec<&str> = variant.iter().map(AsRef::as_ref).collect();
        let script = self.source.edit_script(&baseline, &variant)?;
        Ok(render_unified(&script, &baseline, &variant, &self.name, label))
    }

    /// Change count for one label, or the number of changed slots when
    /// `label` is `None`.
    pub fn count_changes(&self, label: Option<&str>) -> usize {
        match label {
            Some(label) => self.state.count_changes(label),
            None => self.state.count_changed_lines(),
        }
    }

    /// Number of slots with at least one non-`SAME` annotation.
    pub fn count_changed_lines(&self) -> usize {
        self.state.count_changed_lines()
    }

    pub fn export_raw(&self) -> RawExport {
        self.state.export_raw()
    }

    /// Report rows using the session's configured options.
    pub fn report_rows(&self) -> Vec<ReportRow> {
        self.report_rows_with(&self.config.report)
    }

    /// Report rows using explicit options.
    pub fn report_rows_with(&self, options: &ReportOptions) -> Vec<ReportRow> {
        build_rows(&self.state, &self.baseline, options)
    }

    /// Per-label change counts, most impactful first.
    pub fn label_stats(&self) -> Vec<LabelStat> {
        label_stats(&self.state)
    }
}

fn rejected(label: &Label, error: EngineError) -> EngineError {
    warn!(label = %label, error = %error, "variant rejected");
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use impact_diff::{DiffAlgorithm, DiffError, DiffResult, Hunk};
    use impact_types::{Classification, Slot};

    use Classification::{Added, Changed, Removed, Same};

    fn classes(changes: &Changes, slot: Slot) -> Vec<Classification> {
        changes
            .state()
            .bucket(slot)
            .map(|b| b.iter().map(|a| a.classification).collect())
            .unwrap_or_default()
    }

    #[test]
    fn identical_content() {
        let mut changes = Changes::new("f", ["line1\n", "line2\n"]);
        assert!(!changes.add_diff("p", &["line1\n", "line2\n"]).unwrap());

        assert!(classes(&changes, Slot::Sentinel).is_empty());
        assert_eq!(classes(&changes, Slot::Line(0)), vec![Same]);
        assert_eq!(classes(&changes, Slot::Line(1)), vec![Same]);
        assert_eq!(changes.count_changes(None), 0);
    }

    #[test]
    fn trailing_insertion() {
        let mut changes = Changes::new("f", ["line1\n", "line2\n"]);
        assert!(changes
            .add_diff("p", &["line1\n", "line2\n", "new_line\n"])
            .unwrap());

        assert_eq!(classes(&changes, Slot::Line(0)), vec![Same]);
        assert_eq!(classes(&changes, Slot::Line(1)), vec![Same, Added]);
    }

    #[test]
    fn leading_insertion() {
        let mut changes = Changes::new("f", ["line1\n"]);
        changes.add_diff("p", &["new_line\n", "line1\n"]).unwrap();

        assert_eq!(classes(&changes, Slot::Sentinel), vec![Added]);
        assert_eq!(classes(&changes, Slot::Line(0)), vec![Same]);
    }

    #[test]
    fn in_place_modify() {
        let mut changes = Changes::new("f", ["line1\n"]);
        changes.add_diff("p", &["line1b\n"]).unwrap();

        assert!(classes(&changes, Slot::Sentinel).is_empty());
        assert_eq!(classes(&changes, Slot::Line(0)), vec![Changed]);
    }

    #[test]
    fn mixed_block() {
        let mut changes = Changes::new(
            "f",
            ["line1\n", "line2a\n", "line2b\n", "line3a\n", "line3b\n", "line4\n"],
        );
        changes
            .add_diff("p", &["line1\n", "line21\n", "line22\n", "line4\n"])
            .unwrap();

        let verdicts: Vec<Vec<Classification>> =
            (0..6).map(|i| classes(&changes, Slot::Line(i))).collect();
        assert_eq!(
            verdicts,
            vec![
                vec![Same],
                vec![Changed],
                vec![Changed],
                vec![Removed],
                vec![Removed],
                vec![Same],
            ]
        );
        assert!(classes(&changes, Slot::Sentinel).is_empty());
    }

    #[test]
    fn equal_length_block_is_changed() {
        let mut changes = Changes::new("f", ["line1\n", "line2\n", "line3\n", "line4\n"]);
        changes
            .add_diff("p", &["line1\n", "line2a\n", "line2b\n", "line4\n"])
            .unwrap();

        assert_eq!(classes(&changes, Slot::Line(0)), vec![Same]);
        assert_eq!(classes(&changes, Slot::Line(1)), vec![Changed]);
        assert_eq!(classes(&changes, Slot::Line(2)), vec![Changed]);
        assert_eq!(classes(&changes, Slot::Line(3)), vec![Same]);
    }

    #[test]
    fn replaced_block_with_removal() {
        let mut changes = Changes::from_text("f", "line1\nline2\nline3\nline4\nline5\n");
        changes.add_text("p", "line1\nline2a\nline5\n").unwrap();

        assert_eq!(classes(&changes, Slot::Line(1)), vec![Changed]);
        assert_eq!(classes(&changes, Slot::Line(2)), vec![Removed]);
        assert_eq!(classes(&changes, Slot::Line(3)), vec![Removed]);
        assert_eq!(classes(&changes, Slot::Line(4)), vec![Same]);
        assert_eq!(changes.count_changes(Some("p")), 3);
    }

    #[test]
    fn label_independence() {
        let mut changes = Changes::new("f", ["a\n", "b\n", "c\n"]);
        changes.add_diff("A", &["a\n", "B\n", "c\n"]).unwrap();
        let only_a = |changes: &Changes| -> Vec<(Slot, Vec<Classification>)> {
            changes
                .export_raw()
                .iter()
                .map(|(slot, entries)| {
                    let mine = entries
                        .iter()
                        .filter(|(l, _)| l == "A")
                        .map(|(_, c)| *c)
                        .collect();
                    (slot, mine)
                })
                .collect()
        };
        let before = only_a(&changes);

        changes.add_diff("B", &["x\n", "a\n", "c\n"]).unwrap();

        assert_eq!(only_a(&changes), before);
        assert_eq!(changes.count_changes(Some("A")), 1);
    }

    #[test]
    fn export_agrees_with_changed_line_count() {
        let mut changes = Changes::new("f", ["a\n", "b\n", "c\n", "d\n"]);
        changes.add_diff("x", &["top\n", "a\n", "b\n", "d\n"]).unwrap();
        changes.add_diff("y", &["a\n", "b\n", "C\n", "d\n", "e\n"]).unwrap();

        let export = changes.export_raw();
        assert_eq!(export.changed_slots(), changes.count_changed_lines());
        assert_eq!(changes.count_changes(None), changes.count_changed_lines());
    }

    #[test]
    fn unified_text_and_markers_agree_with_line_diff() {
        let base = ["a\n", "b\n", "c\n"];
        let variant = ["a\n", "B\n", "B2\n", "c\n"];

        let mut direct = Changes::new("f", base);
        direct.add_diff("p", &variant).unwrap();

        let mut from_text = Changes::new("f", base);
        let text = from_text.unified_diff("p", &variant).unwrap();
        assert!(text.starts_with("--- f\n+++ p\n@@ -2 +2,2 @@\n"));
        from_text.parse_unified("p", &text).unwrap();

        let mut from_markers = Changes::new("f", base);
        from_markers
            .add_markers("p", ["  a\n", "- b\n", "+ B\n", "+ B2\n", "  c\n"])
            .unwrap();

        assert_eq!(from_text.export_raw(), direct.export_raw());
        assert_eq!(from_markers.export_raw(), direct.export_raw());
    }

    #[test]
    fn identical_variant_renders_empty_diff() {
        let changes = Changes::new("f", ["a\n"]);
        assert_eq!(changes.unified_diff("p", &["a\n"]).unwrap(), "");
    }

    #[test]
    fn failed_variant_leaves_session_unchanged() {
        let mut changes = Changes::new("f", ["a\n", "b\n"]);
        changes.add_diff("ok", &["a\n", "x\n"]).unwrap();
        let before = changes.export_raw();

        let err = changes.add_markers("bad", ["  a\n", "! b\n"]).unwrap_err();
        assert_eq!(err, EngineError::UnknownClassification("! ".to_string()));

        let err = changes.parse_unified("bad", "@@ -5 +5 @@\n-e\n+f\n").unwrap_err();
        assert!(matches!(err, EngineError::DiffSource(_)));

        let out_of_order = EditScript::new(2, 2, vec![Hunk::new(1, 1, 1, 1), Hunk::new(0, 1, 0, 1)]);
        let err = changes.parse_diff("bad", &out_of_order).unwrap_err();
        assert!(matches!(err, EngineError::OrderingViolation { .. }));

        assert_eq!(changes.export_raw(), before);
        assert_eq!(changes.labels(), &[Label::from("ok")]);
    }

    #[test]
    fn overflowing_unified_header_is_rejected() {
        let mut changes = Changes::new("f", ["a\n", "b\n"]);
        let err = changes
            .parse_unified("p", "@@ -18446744073709551615,2 +1 @@\n-a\n-b\n+c\n")
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::DiffSource(DiffError::HunkOutOfRange { side: "baseline", .. })
        ));

        let err = changes
            .parse_diff("p", &EditScript::new(2, 2, vec![Hunk::new(usize::MAX - 1, 2, 0, 1)]))
            .unwrap_err();
        assert!(matches!(err, EngineError::DiffSource(DiffError::HunkOutOfRange { .. })));
        assert!(changes.labels().is_empty());
    }

    #[test]
    fn inconsistent_script_is_rejected() {
        let mut changes = Changes::new("f", ["a\n", "b\n", "c\n"]);
        let script = EditScript::new(3, 7, vec![Hunk::new(1, 1, 1, 1)]);
        let err = changes.parse_diff("p", &script).unwrap_err();
        assert_eq!(
            err,
            EngineError::DiffSource(DiffError::VariantLengthMismatch {
                expected: 3,
                actual: 7
            })
        );
        assert!(changes.labels().is_empty());
    }

    #[test]
    fn custom_source_is_used() {
        struct Broken;
        impl DiffSource for Broken {
            fn edit_script(&self, _: &[&str], _: &[&str]) -> DiffResult<EditScript> {
                Err(DiffError::EmptyHunk { old_start: 0 })
            }
        }

        let mut changes = Changes::new("f", ["a\n"]).with_source(Broken);
        let err = changes.add_diff("p", &["b\n"]).unwrap_err();
        assert_eq!(err, EngineError::DiffSource(DiffError::EmptyHunk { old_start: 0 }));
        assert!(changes.labels().is_empty());
    }

    #[test]
    fn config_drives_algorithm_and_report() {
        let config = SessionConfig::from_toml_str(
            r#"
            algorithm = "patience"
            [report]
            removed_as_changed = true
            "#,
        )
        .unwrap();
        let mut changes = Changes::with_config("f", ["a\n", "b\n", "c\n"], config);
        assert_eq!(changes.config().algorithm, DiffAlgorithm::Patience);

        changes.add_diff("x", &["a\n", "c\n"]).unwrap();
        let rows = changes.report_rows();
        assert_eq!(rows[1].classification, Changed);
        assert_eq!(rows[1].labels, vec![Label::from("x")]);

        let rows = changes.report_rows_with(&ReportOptions::default());
        assert_eq!(rows[1].classification, Removed);
    }

    #[test]
    fn accessors() {
        let changes = Changes::from_text("file.txt", "one\ntwo");
        assert_eq!(changes.name(), "file.txt");
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.content_line(1), Some("two"));
        assert_eq!(changes.content_line(2), None);
        assert_eq!(changes.baseline(), &["one\n".to_string(), "two".to_string()]);

        let debug = format!("{changes:?}");
        assert!(debug.contains("file.txt"));
    }

    #[test]
    fn label_stats_ranked() {
        let mut changes = Changes::new("f", ["a\n", "b\n"]);
        changes.add_diff("low", &["a\n", "B\n"]).unwrap();
        changes.add_diff("high", &["A\n", "b\n", "c\n"]).unwrap();

        let stats = changes.label_stats();
        assert_eq!(stats[0].label, Label::from("high"));
        assert_eq!(stats[0].changes, 2);
        assert_eq!(stats[1].label, Label::from("low"));
        assert_eq!(stats[1].changes, 1);
    }

    #[test]
    fn sessions_move_across_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<Changes>();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let mut changes = Changes::new(format!("f{i}"), ["a\n", "b\n"]);
                    changes.add_diff("p", &["a\n", "c\n"]).unwrap();
                    changes.count_changed_lines()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }

    fn lines() -> impl proptest::strategy::Strategy<Value = Vec<String>> {
        proptest::collection::vec("[abc]\n", 0..8)
    }

    proptest::proptest! {
        #[test]
        fn identical_variant_never_changes(base in lines()) {
            let mut changes = Changes::new("f", base.clone());
            proptest::prop_assert!(!changes.add_diff("p", &base).unwrap());
            proptest::prop_assert_eq!(changes.count_changed_lines(), 0);
            proptest::prop_assert!(classes(&changes, Slot::Sentinel).is_empty());
        }

        #[test]
        fn every_line_gets_one_verdict(base in lines(), variant in lines()) {
            let mut changes = Changes::new("f", base.clone());
            changes.add_diff("p", &variant).unwrap();
            for i in 0..base.len() {
                let verdicts = classes(&changes, Slot::Line(i))
                    .into_iter()
                    .filter(|c| !c.is_added())
                    .count();
                proptest::prop_assert_eq!(verdicts, 1);
            }
        }

        #[test]
        fn export_matches_counts(base in lines(), a in lines(), b in lines()) {
            let mut changes = Changes::new("f", base);
            changes.add_diff("a", &a).unwrap();
            changes.add_diff("b", &b).unwrap();
            proptest::prop_assert_eq!(
                changes.export_raw().changed_slots(),
                changes.count_changed_lines()
            );
        }

        #[test]
        fn unified_roundtrip(base in lines(), variant in lines()) {
            let mut direct = Changes::new("f", base.clone());
            direct.add_diff("p", &variant).unwrap();

            let mut parsed = Changes::new("f", base);
            let text = parsed.unified_diff("p", &variant).unwrap();
            parsed.parse_unified("p", &text).unwrap();

            proptest::prop_assert_eq!(parsed.export_raw(), direct.export_raw());
        }
    }
}
