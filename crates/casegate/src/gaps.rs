//! Gap synthesis.
//!
//! Turns failing signals into a deduplicated backlog whose identifiers are
//! content-addressed: the same underlying failure always yields the same
//! `gap_id`, across runs and regardless of signal order or wording.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::report::AggregateResult;

const GAP_ID_DOMAIN: &[u8] = b"casegate-gap-v1\0";
const GAP_ID_HEX_LEN: usize = 16;

/// Closed set of gap types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum GapType {
    /// A gate did not pass.
    GateFailed,
    MissingFinding,
    OpenTask,
    UncapturedSource,
    MissingSection,
    UnresolvedContradiction,
    DanglingCitation,
    LegalIssue,
    UnsupportedClaim,
}

impl GapType {
    pub fn as_str(self) -> &'static str {
        match self {
            GapType::GateFailed => "GATE_FAILED",
            GapType::MissingFinding => "MISSING_FINDING",
            GapType::OpenTask => "OPEN_TASK",
            GapType::UncapturedSource => "UNCAPTURED_SOURCE",
            GapType::MissingSection => "MISSING_SECTION",
            GapType::UnresolvedContradiction => "UNRESOLVED_CONTRADICTION",
            GapType::DanglingCitation => "DANGLING_CITATION",
            GapType::LegalIssue => "LEGAL_ISSUE",
            GapType::UnsupportedClaim => "UNSUPPORTED_CLAIM",
        }
    }

    /// Gate-level failures block; targeted findings are advisory unless the
    /// signal says otherwise.
    pub fn default_blocking(self) -> bool {
        matches!(self, GapType::GateFailed)
    }
}

impl fmt::Display for GapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-addressed gap identifier, `GAP-` followed by 16 hex chars.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GapId(String);

impl GapId {
    /// Derive the identifier from a gap's defining characteristics.
    ///
    /// The subject is the target when one exists, else the source. The
    /// subject's role is hashed too, so a target never collides with a
    /// source of the same spelling.
    pub fn derive(kind: GapType, source: &str, target: Option<&str>) -> Self {
        let (role, subject) = match target {
            Some(target) => (&b"target\0"[..], normalize(target)),
            None => (&b"source\0"[..], normalize(source)),
        };
        let mut hasher = blake3::Hasher::new();
        hasher.update(GAP_ID_DOMAIN);
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(role);
        hasher.update(subject.as_bytes());
        let hex = hasher.finalize().to_hex();
        Self(format!("GAP-{}", &hex[..GAP_ID_HEX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim, lowercase and collapse internal whitespace.
fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A typed failure signal. Failing gate reports are the main producer, but
/// callers may feed their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSignal {
    pub kind: GapType,
    pub source: String,
    pub target: Option<String>,
    pub description: String,
    pub blocking: Option<bool>,
}

impl FailureSignal {
    pub fn new(kind: GapType, source: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            target: None,
            description: description.into(),
            blocking: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = Some(blocking);
        self
    }

    pub fn gap_id(&self) -> GapId {
        GapId::derive(self.kind, &self.source, self.target.as_deref())
    }
}

/// One deduplicated remediation item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub gap_id: GapId,
    #[serde(rename = "type")]
    pub gap_type: GapType,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub description: String,
    pub blocking: bool,
    pub reported_by: Vec<String>,
}

impl Gap {
    fn from_signal(id: GapId, signal: FailureSignal) -> Self {
        let blocking = signal
            .blocking
            .unwrap_or_else(|| signal.kind.default_blocking());
        Self {
            gap_id: id,
            gap_type: signal.kind,
            reported_by: vec![signal.source.clone()],
            source: signal.source,
            target: signal.target,
            description: signal.description,
            blocking,
        }
    }

    /// Fold another signal with the same id into this gap. The result does
    /// not depend on merge order.
    fn absorb(&mut self, signal: FailureSignal) {
        let blocking = signal
            .blocking
            .unwrap_or_else(|| signal.kind.default_blocking());
        self.blocking |= blocking;

        if !self.reported_by.contains(&signal.source) {
            self.reported_by.push(signal.source.clone());
            self.reported_by.sort();
        }

        let incoming = (&signal.source, &signal.description, &signal.target);
        if incoming < (&self.source, &self.description, &self.target) {
            self.source = signal.source;
            self.description = signal.description;
            self.target = signal.target;
        }
    }
}

/// Blocking and advisory gaps, each sorted by `gap_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapList {
    pub blocking: Vec<Gap>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisory: Vec<Gap>,
}

impl GapList {
    pub fn is_empty(&self) -> bool {
        self.blocking.is_empty() && self.advisory.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocking.len() + self.advisory.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gap> {
        self.blocking.iter().chain(self.advisory.iter())
    }
}

/// Derives gaps from failing signals.
pub struct GapSynthesizer;

impl GapSynthesizer {
    /// Gaps for every failing gate in a run.
    pub fn synthesize(result: &AggregateResult) -> GapList {
        Self::from_signals(Self::signals_from(result))
    }

    /// One `GateFailed` signal per failing gate, plus one signal per finding.
    pub fn signals_from(result: &AggregateResult) -> Vec<FailureSignal> {
        let mut signals = Vec::new();
        for report in result.failing() {
            let reason = report.reason.as_deref().unwrap_or("no reason given");
            signals.push(FailureSignal::new(
                GapType::GateFailed,
                &report.gate,
                format!("gate '{}' failed: {}", report.gate, reason),
            ));
            for finding in &report.findings {
                signals.push(
                    FailureSignal::new(finding.kind, &report.gate, &finding.message)
                        .with_target(&finding.target),
                );
            }
        }
        signals
    }

    /// Deduplicate signals into a gap list.
    pub fn from_signals(signals: impl IntoIterator<Item = FailureSignal>) -> GapList {
        let mut gaps: BTreeMap<GapId, Gap> = BTreeMap::new();
        for signal in signals {
            let id = signal.gap_id();
            match gaps.get_mut(&id) {
                Some(existing) => existing.absorb(signal),
                None => {
                    gaps.insert(id.clone(), Gap::from_signal(id, signal));
                }
            }
        }

        let (blocking, advisory): (Vec<Gap>, Vec<Gap>) =
            gaps.into_values().partition(|g| g.blocking);
        GapList { blocking, advisory }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use proptest::prelude::*;

    fn gate_failed(gate: &str, reason: &str) -> FailureSignal {
        FailureSignal::new(GapType::GateFailed, gate, reason)
    }

    #[test]
    fn gap_id_has_stable_shape() {
        let id = GapId::derive(GapType::GateFailed, "claims", None);
        assert!(id.as_str().starts_with("GAP-"));
        assert_eq!(id.as_str().len(), 4 + GAP_ID_HEX_LEN);
        assert_eq!(id, GapId::derive(GapType::GateFailed, "claims", None));
    }

    #[test]
    fn gap_id_depends_on_type_and_subject() {
        let a = GapId::derive(GapType::GateFailed, "claims", None);
        let b = GapId::derive(GapType::GateFailed, "sources", None);
        let c = GapId::derive(GapType::OpenTask, "claims", None);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn targeted_gaps_ignore_the_reporting_gate() {
        let a = GapId::derive(GapType::UncapturedSource, "sources", Some("S3"));
        let b = GapId::derive(GapType::UncapturedSource, "rigor", Some(" s3 "));
        assert_eq!(a, b);
    }

    #[test]
    fn target_and_source_of_same_spelling_stay_distinct() {
        let by_source = FailureSignal::new(GapType::OpenTask, "T7", "T7 stalled");
        let by_target = FailureSignal::new(GapType::OpenTask, "tasks", "task T7 open").with_target("T7");
        assert_ne!(by_source.gap_id(), by_target.gap_id());

        let list = GapSynthesizer::from_signals([by_source, by_target]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn reworded_reason_keeps_identity() {
        let first = GapSynthesizer::from_signals([gate_failed("claims", "key missing")]);
        let second = GapSynthesizer::from_signals([gate_failed(
            "claims",
            "missing credential: verification API key is not set",
        )]);
        assert_eq!(first.blocking[0].gap_id, second.blocking[0].gap_id);
        assert_ne!(first.blocking[0].description, second.blocking[0].description);
    }

    #[test]
    fn duplicate_signals_collapse() {
        let list = GapSynthesizer::from_signals([
            FailureSignal::new(GapType::UncapturedSource, "sources", "S3 not captured")
                .with_target("S3"),
            FailureSignal::new(GapType::UncapturedSource, "coverage", "source S3 missing")
                .with_target("S3"),
        ]);
        assert_eq!(list.len(), 1);
        let gap = &list.advisory[0];
        assert_eq!(gap.source, "coverage");
        assert_eq!(gap.description, "source S3 missing");
        assert_eq!(gap.reported_by, vec!["coverage", "sources"]);
    }

    #[test]
    fn blocking_defaults_follow_type() {
        let list = GapSynthesizer::from_signals([
            gate_failed("tasks", "open tasks"),
            FailureSignal::new(GapType::OpenTask, "tasks", "T2 open").with_target("T2"),
            FailureSignal::new(GapType::LegalIssue, "legal", "L1 open")
                .with_target("L1")
                .with_blocking(true),
        ]);
        assert_eq!(list.blocking.len(), 2);
        assert_eq!(list.advisory.len(), 1);
        assert_eq!(list.advisory[0].gap_type, GapType::OpenTask);
    }

    #[test]
    fn merged_gap_blocks_if_any_signal_blocks() {
        let list = GapSynthesizer::from_signals([
            FailureSignal::new(GapType::OpenTask, "tasks", "T2 open").with_target("T2"),
            FailureSignal::new(GapType::OpenTask, "coverage", "T2 open")
                .with_target("T2")
                .with_blocking(true),
        ]);
        assert_eq!(list.blocking.len(), 1);
        assert!(list.advisory.is_empty());
    }

    #[test]
    fn output_is_sorted_by_gap_id() {
        let list = GapSynthesizer::from_signals(
            ["rigor", "claims", "tasks", "adversarial"]
                .into_iter()
                .map(|g| gate_failed(g, "failed")),
        );
        let ids: Vec<_> = list.blocking.iter().map(|g| g.gap_id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn serializes_type_field() {
        let list = GapSynthesizer::from_signals([gate_failed("claims", "missing")]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["blocking"][0]["type"], "GATE_FAILED");
        assert!(json.get("advisory").is_none());
    }

    fn arb_signal() -> impl Strategy<Value = FailureSignal> {
        (
            prop_oneof![
                Just(GapType::GateFailed),
                Just(GapType::OpenTask),
                Just(GapType::UncapturedSource),
                Just(GapType::DanglingCitation),
            ],
            prop_oneof![Just("tasks"), Just("sources"), Just("rigor"), Just("claims")],
            proptest::option::of("[A-Z][0-9]{1,2}"),
            "[a-z ]{0,24}",
        )
            .prop_map(|(kind, source, target, description)| {
                let signal = FailureSignal::new(kind, source, description);
                match target {
                    Some(t) => signal.with_target(t),
                    None => signal,
                }
            })
    }

    /// A target spelled with arbitrary case and whitespace around and
    /// between its words.
    fn spelled_variant(words: &[String], upper: &[bool], gaps: &[String]) -> String {
        let mut out = gaps[0].clone();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                out.push_str(&gaps[i]);
            }
            if upper[i] {
                out.push_str(&word.to_uppercase());
            } else {
                out.push_str(word);
            }
        }
        out.push_str(&gaps[words.len()]);
        out
    }

    proptest! {
        #[test]
        fn gap_list_is_independent_of_signal_order(
            (signals, shuffled) in prop::collection::vec(arb_signal(), 0..16)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let a = GapSynthesizer::from_signals(signals);
            let b = GapSynthesizer::from_signals(shuffled);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn target_spelling_does_not_change_identity(
            kind in prop_oneof![Just(GapType::OpenTask), Just(GapType::UncapturedSource)],
            words in prop::collection::vec("[a-z0-9]{1,6}", 1..4),
            upper in prop::collection::vec(any::<bool>(), 4),
            gaps in prop::collection::vec("[ \t\n]{1,3}", 5),
            source_a in "[a-z]{1,8}",
            source_b in "[a-z]{1,8}",
        ) {
            let canonical = words.join(" ");
            let variant = spelled_variant(&words, &upper, &gaps);
            prop_assert_eq!(
                GapId::derive(kind, &source_a, Some(&canonical)),
                GapId::derive(kind, &source_b, Some(&variant))
            );
        }

        #[test]
        fn gap_ids_ignore_descriptions(
            signals in prop::collection::vec(arb_signal(), 0..16),
            suffix in "[a-z]{1,8}",
        ) {
            let reworded: Vec<_> = signals
                .iter()
                .cloned()
                .map(|mut s| { s.description.push_str(&suffix); s })
                .collect();
            let a: BTreeSet<_> = GapSynthesizer::from_signals(signals)
                .iter()
                .map(|g| g.gap_id.clone())
                .collect();
            let b: BTreeSet<_> = GapSynthesizer::from_signals(reworded)
                .iter()
                .map(|g| g.gap_id.clone())
                .collect();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn every_distinct_key_yields_one_gap(signals in prop::collection::vec(arb_signal(), 0..16)) {
            let keys: BTreeSet<_> = signals.iter().map(FailureSignal::gap_id).collect();
            let list = GapSynthesizer::from_signals(signals);
            prop_assert_eq!(list.len(), keys.len());
        }
    }
}
