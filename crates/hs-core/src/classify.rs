//! Result classification
//!
//! The DOM layer reduces each candidate result container to a structural
//! probe; this module turns a probe into a typed [`ResultElement`] or a
//! skip reason. Skips are logged, never raised.

use thiserror::Error;

use crate::types::{ResultElement, ResultKind};
use crate::url::hostname_from_href;

/// Structural facts about one candidate result container, gathered by the
/// DOM layer in a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultProbe {
    /// Direct child carrying a video slot
    pub has_video_slot: bool,
    /// Direct child wrapping an embedded social feed section
    pub has_social_section: bool,
    /// `href` of the first anchor inside the container, if any
    pub anchor_href: Option<String>,
}

/// Why a candidate was excluded from classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifySkip {
    /// Candidate has no anchor link, so there is nothing to match against
    #[error("result has no anchor link")]
    MissingAnchor,
    /// Anchor exists but no hostname could be derived from it
    #[error("no hostname in anchor '{0}'")]
    UnusableAnchor(String),
}

/// Classify one probed candidate.
///
/// Kind is decided by structural probes in priority order: video slot,
/// then social section, then default. The hostname comes from the first
/// anchor; candidates without a usable anchor are excluded (they can
/// neither be matched nor acted upon).
pub fn classify(probe: &ResultProbe) -> Result<ResultElement, ClassifySkip> {
    let href = probe
        .anchor_href
        .as_deref()
        .ok_or(ClassifySkip::MissingAnchor)?;

    let hostname = hostname_from_href(href)
        .ok_or_else(|| ClassifySkip::UnusableAnchor(href.to_owned()))?;

    let kind = if probe.has_video_slot {
        ResultKind::Video
    } else if probe.has_social_section {
        ResultKind::Social
    } else {
        ResultKind::Default
    };

    Ok(ResultElement::new(kind, hostname))
}

/// Classify a batch of probes, logging and dropping skips. The returned
/// indices point back into `probes` so callers can re-pair elements with
/// their DOM nodes.
pub fn classify_all(probes: &[ResultProbe]) -> Vec<(usize, ResultElement)> {
    let mut classified = Vec::with_capacity(probes.len());

    for (index, probe) in probes.iter().enumerate() {
        match classify(probe) {
            Ok(element) => classified.push((index, element)),
            Err(skip) => log::debug!("skipping result {index}: {skip}"),
        }
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(video: bool, social: bool, href: Option<&str>) -> ResultProbe {
        ResultProbe {
            has_video_slot: video,
            has_social_section: social,
            anchor_href: href.map(str::to_owned),
        }
    }

    #[test]
    fn test_classify_default_result() {
        let element = classify(&probe(false, false, Some("https://www.example.com/page"))).unwrap();
        assert_eq!(element.kind, ResultKind::Default);
        assert_eq!(element.hostname, "example.com");
    }

    #[test]
    fn test_classify_video_takes_priority_over_social() {
        let element = classify(&probe(true, true, Some("https://videos.example.com"))).unwrap();
        assert_eq!(element.kind, ResultKind::Video);
    }

    #[test]
    fn test_classify_social_result() {
        let element = classify(&probe(false, true, Some("https://social.example.com/feed"))).unwrap();
        assert_eq!(element.kind, ResultKind::Social);
    }

    #[test]
    fn test_classify_skips_missing_anchor() {
        assert_eq!(
            classify(&probe(false, false, None)),
            Err(ClassifySkip::MissingAnchor)
        );
    }

    #[test]
    fn test_classify_skips_unusable_anchor() {
        assert_eq!(
            classify(&probe(false, false, Some("https://"))),
            Err(ClassifySkip::UnusableAnchor("https://".into()))
        );
    }

    #[test]
    fn test_classify_all_drops_skips_and_keeps_indices() {
        let probes = vec![
            probe(false, false, Some("https://a.example.com")),
            probe(false, false, None),
            probe(true, false, Some("https://b.example.com")),
        ];

        let classified = classify_all(&probes);
        assert_eq!(classified.len(), 2);
        assert_eq!(classified[0].0, 0);
        assert_eq!(classified[1].0, 2);
        assert_eq!(classified[1].1.kind, ResultKind::Video);
    }
}
