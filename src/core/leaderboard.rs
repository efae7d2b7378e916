use std::cmp::Ordering;

use crate::models::LeaderboardRow;

/// Order an unordered store snapshot into the leaderboard.
///
/// Sort key, fixed and documented: rating descending, then match count
/// descending (more played ranks ahead on equal rating), then profile id
/// ascending as the final disambiguator. Profile ids are unique, so the
/// ordering is total: identical input always produces identical output.
///
/// Pure read-side ordering; the store hands over rows unsorted so this rule
/// lives in exactly one place.
pub fn build_leaderboard(mut rows: Vec<LeaderboardRow>) -> Vec<LeaderboardRow> {
    rows.sort_by(compare_rows);
    rows
}

fn compare_rows(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    b.rating
        .rating
        .cmp(&a.rating.rating)
        .then_with(|| b.rating.match_count.cmp(&a.rating.match_count))
        .then_with(|| a.profile_id.cmp(&b.profile_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatingRecord;
    use uuid::Uuid;

    fn row(id: u128, rating: i32, match_count: u64) -> LeaderboardRow {
        LeaderboardRow {
            profile_id: Uuid::from_u128(id),
            name: format!("Profile {}", id),
            photo_url: "https://example.com/p.jpg".to_string(),
            rating: RatingRecord {
                rating,
                match_count,
            },
        }
    }

    #[test]
    fn test_sorted_by_rating_descending() {
        let rows = vec![row(1, 1400, 3), row(2, 1620, 9), row(3, 1500, 1)];
        let board = build_leaderboard(rows);

        let ratings: Vec<i32> = board.iter().map(|r| r.rating.rating).collect();
        assert_eq!(ratings, vec![1620, 1500, 1400]);
        for pair in board.windows(2) {
            assert!(pair[0].rating.rating >= pair[1].rating.rating);
        }
    }

    #[test]
    fn test_ties_broken_by_match_count_then_id() {
        let rows = vec![
            row(9, 1500, 2),
            row(1, 1500, 7),
            row(5, 1500, 2),
            row(3, 1500, 7),
        ];
        let board = build_leaderboard(rows);

        let order: Vec<u128> = board.iter().map(|r| r.profile_id.as_u128()).collect();
        // Higher match count first; equal counts fall back to id ascending.
        assert_eq!(order, vec![1, 3, 5, 9]);
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        // The ordering is total, so the store's enumeration order must not
        // leak through: any permutation of the same rows serializes the same.
        let rows = vec![
            row(4, 1516, 1),
            row(7, 1484, 1),
            row(2, 1516, 1),
            row(6, 1500, 0),
        ];
        let mut permuted = rows.clone();
        permuted.reverse();
        permuted.swap(0, 2);

        let first = serde_json::to_string(&build_leaderboard(rows)).unwrap();
        let second = serde_json::to_string(&build_leaderboard(permuted)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_negative_ratings_sort_last() {
        let rows = vec![row(1, -40, 12), row(2, 10, 2), row(3, 1500, 0)];
        let board = build_leaderboard(rows);
        let ratings: Vec<i32> = board.iter().map(|r| r.rating.rating).collect();
        assert_eq!(ratings, vec![1500, 10, -40]);
    }
}
