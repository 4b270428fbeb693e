use std::sync::LazyLock;

use regex::Regex;

static PART_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)((part|cd)[\s_]*)(\d+)").unwrap());

/// Splits a file name around its first `part`/`cd` number marker.
///
/// Returns the text up to and including the keyword (with any whitespace or
/// underscores after it) and the text after the digits.
pub fn split_part_marker(name: &str) -> Option<(&str, &str)> {
    let caps = PART_MARKER.captures(name)?;
    let keyword = caps.get(1)?;
    let digits = caps.get(3)?;
    Some((&name[..keyword.end()], &name[digits.end()..]))
}

pub(crate) fn part_marker_start(name: &str) -> Option<usize> {
    PART_MARKER.find(name).map(|found| found.start())
}

pub fn group_parts(names: &[String]) -> Vec<Vec<String>> {
    let mut consumed = vec![false; names.len()];
    let mut groups = Vec::new();

    for (i, name) in names.iter().enumerate() {
        if consumed[i] || name.is_empty() {
            continue;
        }
        consumed[i] = true;

        let mut group = vec![name.clone()];
        if let Some((left, right)) = split_part_marker(name) {
            for (j, other) in names.iter().enumerate().skip(i + 1) {
                if consumed[j] || other.is_empty() {
                    continue;
                }
                if other.starts_with(left) && other.ends_with(right) {
                    consumed[j] = true;
                    group.push(other.clone());
                }
            }
        }
        groups.push(group);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn split_keeps_separator_on_the_left() {
        assert_eq!(
            split_part_marker("Movie Part 1.mkv"),
            Some(("Movie Part ", ".mkv"))
        );
        assert_eq!(
            split_part_marker("movie_cd_02-x.avi"),
            Some(("movie_cd_", "-x.avi"))
        );
        assert_eq!(split_part_marker("Movie.mkv"), None);
        assert_eq!(split_part_marker("Particle.mkv"), None);
    }

    #[test]
    fn groups_parts_and_leaves_singletons() {
        let groups = group_parts(&names(&["Movie Part 1.mkv", "Movie Part 2.mkv", "Other.mkv"]));
        assert_eq!(
            groups,
            vec![
                names(&["Movie Part 1.mkv", "Movie Part 2.mkv"]),
                names(&["Other.mkv"]),
            ]
        );
    }

    #[test]
    fn keyword_match_ignores_case() {
        let groups = group_parts(&names(&["Show CD1.avi", "Show CD2.avi", "Show cd3.avi"]));
        assert_eq!(
            groups,
            vec![names(&["Show CD1.avi", "Show CD2.avi"]), names(&["Show cd3.avi"])]
        );
    }

    #[test]
    fn order_follows_names_not_numbers() {
        let groups = group_parts(&names(&["Film part10.mkv", "Film part2.mkv", "Film part9.mkv"]));
        assert_eq!(
            groups,
            vec![names(&["Film part10.mkv", "Film part2.mkv", "Film part9.mkv"])]
        );
    }

    #[test]
    fn different_suffix_splits_groups() {
        let groups = group_parts(&names(&["A cd1.avi", "A cd1.mkv", "A cd2.avi", "A cd2.mkv"]));
        assert_eq!(
            groups,
            vec![names(&["A cd1.avi", "A cd2.avi"]), names(&["A cd1.mkv", "A cd2.mkv"])]
        );
    }

    #[test]
    fn empty_names_are_skipped() {
        let groups = group_parts(&names(&["", "Solo part1.mkv", ""]));
        assert_eq!(groups, vec![names(&["Solo part1.mkv"])]);
    }

    #[test]
    fn marker_start_points_at_keyword() {
        assert_eq!(part_marker_start("Movie Part 1"), Some(6));
        assert_eq!(part_marker_start("Movie"), None);
    }
}
