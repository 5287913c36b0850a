//! Creator ranking for discovery.

use std::collections::HashSet;

use crate::scoring::velocity;
use crate::video::{AuthorMeta, Video};

/// Rank distinct creators by the velocity of their best video.
///
/// Videos are sorted by velocity (descending, ties keep input order) and
/// walked once; the first time a creator identifier is seen its author
/// metadata is kept. Videos without an identifier are ignored. At most
/// `top_n` creators are returned.
#[must_use]
pub fn rank_creators(videos: &[Video], now: i64, top_n: usize) -> Vec<AuthorMeta> {
    let mut scored: Vec<(f64, &Video)> = videos.iter().map(|v| (velocity(v, now), v)).collect();
    // `sort_by` is stable, which gives equal scores input-order tie-breaking.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut ranked = Vec::new();

    for (_, video) in scored {
        if ranked.len() >= top_n {
            break;
        }
        let Some(author) = video.author.as_ref() else {
            continue;
        };
        let Some(sec_uid) = author.known_sec_uid() else {
            continue;
        };
        if seen.insert(sec_uid) {
            ranked.push(author.clone());
        }
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::VideoStats;

    const NOW: i64 = 1_700_000_000;

    fn video(sec_uid: Option<&str>, name: &str, likes: u64) -> Video {
        Video {
            create_time: Some(NOW - 3600),
            stats: VideoStats {
                likes,
                ..VideoStats::default()
            },
            author: Some(AuthorMeta {
                sec_uid: sec_uid.map(str::to_owned),
                name: Some(name.to_owned()),
            }),
            ..Video::default()
        }
    }

    fn ids(ranked: &[AuthorMeta]) -> Vec<&str> {
        ranked
            .iter()
            .map(|a| a.sec_uid.as_deref().unwrap_or_default())
            .collect()
    }

    #[test]
    fn ranks_by_best_video_velocity() {
        let videos = vec![
            video(Some("a"), "A low", 10),
            video(Some("b"), "B", 50),
            video(Some("a"), "A high", 100),
            video(Some("c"), "C", 30),
        ];
        let ranked = rank_creators(&videos, NOW, 10);
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
        // Metadata comes from the creator's single best video.
        assert_eq!(ranked[0].name.as_deref(), Some("A high"));
    }

    #[test]
    fn stops_at_top_n() {
        let videos = vec![
            video(Some("a"), "A", 40),
            video(Some("b"), "B", 30),
            video(Some("c"), "C", 20),
        ];
        assert_eq!(ids(&rank_creators(&videos, NOW, 2)), vec!["a", "b"]);
        assert!(rank_creators(&videos, NOW, 0).is_empty());
    }

    #[test]
    fn returns_all_distinct_creators_when_fewer_than_top_n() {
        let videos = vec![
            video(Some("a"), "A", 40),
            video(Some("a"), "A", 30),
            video(Some("b"), "B", 20),
        ];
        assert_eq!(rank_creators(&videos, NOW, 20).len(), 2);
    }

    #[test]
    fn ties_keep_input_order() {
        let videos = vec![
            video(Some("x"), "X", 10),
            video(Some("y"), "Y", 10),
            video(Some("z"), "Z", 10),
        ];
        assert_eq!(ids(&rank_creators(&videos, NOW, 3)), vec!["x", "y", "z"]);
    }

    #[test]
    fn skips_missing_and_empty_identifiers() {
        let mut anonymous = video(None, "nobody", 1_000);
        anonymous.author = None;
        let videos = vec![
            anonymous,
            video(None, "no id", 900),
            video(Some(""), "empty id", 800),
            video(Some("a"), "A", 1),
        ];
        assert_eq!(ids(&rank_creators(&videos, NOW, 5)), vec!["a"]);
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        let videos = vec![video(Some("Abc"), "upper", 20), video(Some("abc"), "lower", 10)];
        assert_eq!(ids(&rank_creators(&videos, NOW, 5)), vec!["Abc", "abc"]);
    }

    #[test]
    fn never_returns_duplicates() {
        let videos: Vec<Video> = (0..50)
            .map(|i| video(Some(["a", "b", "c"][i % 3]), "n", i as u64))
            .collect();
        let ranked = rank_creators(&videos, NOW, 10);
        let unique: HashSet<_> = ids(&ranked).into_iter().collect();
        assert_eq!(unique.len(), ranked.len());
        assert_eq!(ranked.len(), 3);
    }
}
