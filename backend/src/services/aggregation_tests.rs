#[cfg(test)]
mod tests {
    use crate::models::{AttendanceEntry, AttendanceStore, Category, Presence, SubjectPresence};
    use crate::services::aggregation::*;
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_presence() -> SubjectPresence {
        let mut items = SubjectPresence::new();
        items.insert(d(2013, 10, 1), Presence::new(t(9, 0, 0), t(17, 30, 0)));
        items.insert(d(2013, 10, 8), Presence::new(t(9, 0, 0), t(17, 0, 0)));
        items.insert(d(2013, 10, 2), Presence::new(t(8, 30, 0), t(16, 45, 0)));
        items
    }

    fn located(
        subject_id: i64,
        day: NaiveDate,
        hours: u32,
        location: Option<&str>,
        category: Option<Category>,
    ) -> AttendanceEntry {
        AttendanceEntry {
            subject_id,
            day,
            start: t(8, 0, 0),
            end: t(8 + hours, 0, 0),
            location: location.map(str::to_string),
            category,
        }
    }

    #[test]
    fn test_group_by_weekday() {
        let grouped = group_by_weekday(&sample_presence());

        let expected: WeekdayBucket<Vec<i64>> = vec![
            (0, vec![]),
            (1, vec![30600, 28800]),
            (2, vec![29700]),
            (3, vec![]),
            (4, vec![]),
            (5, vec![]),
            (6, vec![]),
        ]
        .into_iter()
        .collect();
        assert_eq!(grouped, expected);
    }

    #[test]
    fn test_group_by_weekday_empty_has_all_days() {
        let grouped = group_by_weekday(&SubjectPresence::new());

        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), (0..7).collect::<Vec<_>>());
        assert!(grouped.values().all(Vec::is_empty));
    }

    #[test]
    fn test_group_by_weekday_start_end() {
        let grouped = group_by_weekday_start_end(&sample_presence());

        assert_eq!(grouped.len(), 7);
        assert_eq!(grouped[&1].starts, vec![32400, 32400]);
        assert_eq!(grouped[&1].ends, vec![63000, 61200]);
        assert_eq!(grouped[&2].starts, vec![30600]);
        assert_eq!(grouped[&2].ends, vec![60300]);
        for day in [0, 3, 4, 5, 6] {
            assert_eq!(grouped[&day], StartEnd::default());
        }
    }

    #[test]
    fn test_single_row_end_to_end_buckets() {
        let mut items = SubjectPresence::new();
        items.insert(d(2013, 10, 1), Presence::new(t(9, 0, 0), t(17, 30, 0)));

        let durations = group_by_weekday(&items);
        assert_eq!(durations[&1], vec![30600]);
        assert!(durations.iter().filter(|(k, _)| **k != 1).all(|(_, v)| v.is_empty()));

        let start_end = group_by_weekday_start_end(&items);
        assert_eq!(mean_by_weekday(1, &start_end[&1]), Some(("Tue", 32400.0, 63000.0)));
        assert_eq!(mean_by_weekday(0, &start_end[&0]), Some(("Mon", 0.0, 0.0)));
    }

    #[test]
    fn test_mean_by_weekday_out_of_range() {
        assert_eq!(mean_by_weekday(7, &StartEnd::default()), None);

        let mut buckets = group_by_weekday(&sample_presence());
        buckets.insert(9, vec![100]);
        assert_eq!(weekday_means(&buckets).len(), 7);
        assert_eq!(weekday_totals(&buckets).len(), 7);
    }

    #[test]
    fn test_weekday_means_and_totals() {
        let grouped = group_by_weekday(&sample_presence());

        let means = weekday_means(&grouped);
        assert_eq!(means.len(), 7);
        assert_eq!(means[0], ("Mon", 0.0));
        assert_eq!(means[1], ("Tue", 29700.0));
        assert_eq!(means[6], ("Sun", 0.0));

        let totals = weekday_totals(&grouped);
        assert_eq!(totals[1], ("Tue", 59400));
        assert_eq!(totals[2], ("Wed", 29700));
        assert_eq!(totals[5], ("Sat", 0));
    }

    #[test]
    fn test_negative_duration_is_not_clamped() {
        let mut items = SubjectPresence::new();
        items.insert(d(2013, 10, 7), Presence::new(t(18, 0, 0), t(10, 0, 0)));

        assert_eq!(group_by_weekday(&items)[&0], vec![-28800]);
    }

    #[test]
    fn test_month_location_totals() {
        let store: AttendanceStore = vec![
            located(10, d(2013, 9, 30), 8, Some("Wroclaw"), None),
            located(11, d(2013, 9, 30), 4, Some("Wroclaw"), None),
            located(10, d(2013, 10, 1), 6, Some("Poznan"), None),
            located(10, d(2013, 10, 2), 2, None, None),
        ]
        .into_iter()
        .collect();

        let table = month_location_totals(&store);

        assert_eq!(table.len(), 2);
        assert_eq!(table["2013-09"]["Wroclaw"], 12 * 3600);
        assert_eq!(table["2013-10"]["Poznan"], 6 * 3600);
        assert_eq!(table["2013-10"].len(), 1);
    }

    #[test]
    fn test_month_location_totals_basic_schema_is_empty() {
        let store: AttendanceStore = vec![located(10, d(2013, 9, 30), 8, None, None)]
            .into_iter()
            .collect();

        assert!(month_location_totals(&store).is_empty());
        assert_eq!(
            months_present(&store).into_iter().collect::<Vec<_>>(),
            vec!["2013-09".to_string()]
        );
    }

    #[test]
    fn test_location_category_totals_filters_month() {
        let store: AttendanceStore = vec![
            located(10, d(2013, 10, 1), 8, Some("Wroclaw"), Some(Category::Office)),
            located(11, d(2013, 10, 1), 2, Some("Wroclaw"), Some(Category::Office)),
            located(10, d(2013, 10, 2), 4, Some("Wroclaw"), Some(Category::Remote)),
            located(10, d(2013, 10, 3), 3, Some("Poznan"), Some(Category::Training)),
            located(10, d(2013, 10, 4), 5, Some("Poznan"), None),
            located(10, d(2013, 11, 4), 7, Some("Poznan"), Some(Category::Training)),
        ]
        .into_iter()
        .collect();

        let table = location_category_totals(&store, "2013-10");

        assert_eq!(table["Wroclaw"][&Category::Office], 10 * 3600);
        assert_eq!(table["Wroclaw"][&Category::Remote], 4 * 3600);
        assert_eq!(table["Poznan"][&Category::Training], 3 * 3600);
        assert_eq!(table["Poznan"].len(), 1);
        assert!(location_category_totals(&store, "2014-01").is_empty());
    }

    #[test]
    fn test_restructure_transposes() {
        let mut table: LocationCategoryTable = BTreeMap::new();
        table
            .entry("Wroclaw".to_string())
            .or_default()
            .insert(Category::Office, 100);
        table
            .entry("Poznan".to_string())
            .or_default()
            .insert(Category::Office, 50);
        table
            .entry("Poznan".to_string())
            .or_default()
            .insert(Category::Remote, 7);

        let transposed: CategoryLocationTable = restructure(&table);

        assert_eq!(transposed[&Category::Office]["Wroclaw"], 100);
        assert_eq!(transposed[&Category::Office]["Poznan"], 50);
        assert_eq!(transposed[&Category::Remote]["Poznan"], 7);
        assert!(!transposed[&Category::Remote].contains_key("Wroclaw"));
    }

    fn triples<A: Clone, B: Clone, V: Clone>(
        table: &BTreeMap<A, BTreeMap<B, V>>,
    ) -> Vec<(A, B, V)> {
        table
            .iter()
            .flat_map(|(a, row)| row.iter().map(move |(b, v)| (a.clone(), b.clone(), v.clone())))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_restructure_roundtrip_rectangular(
            rows in proptest::collection::btree_set("[a-z]{1,6}", 1..6),
            cols in proptest::collection::btree_set(0u8..20, 1..6),
            seed in any::<i64>(),
        ) {
            let table: BTreeMap<String, BTreeMap<u8, i64>> = rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let cells = cols
                        .iter()
                        .map(|c| (*c, seed.wrapping_add((i as i64) * 31 + i64::from(*c))))
                        .collect();
                    (row.clone(), cells)
                })
                .collect();

            prop_assert_eq!(restructure(&restructure(&table)), table);
        }

        #[test]
        fn prop_restructure_is_bijection_on_triples(
            table in proptest::collection::btree_map(
                "[a-z]{1,4}",
                proptest::collection::btree_map(0u8..10, any::<i32>(), 0..5),
                0..6,
            )
        ) {
            let mut forward: Vec<(String, u8, i32)> = triples(&table);
            let mut backward: Vec<(String, u8, i32)> = triples(&restructure(&table))
                .into_iter()
                .map(|(b, a, v)| (a, b, v))
                .collect();
            forward.sort();
            backward.sort();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn prop_group_by_weekday_always_seven_keys(
            days in proptest::collection::vec(0i64..3650, 0..40),
        ) {
            let base = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
            let items: SubjectPresence = days
                .iter()
                .map(|offset| {
                    (
                        base + chrono::Duration::days(*offset),
                        Presence::new(t(9, 0, 0), t(17, 0, 0)),
                    )
                })
                .collect();

            let grouped = group_by_weekday(&items);
            prop_assert_eq!(grouped.len(), 7);
            prop_assert_eq!(grouped.values().map(Vec::len).sum::<usize>(), items.len());
        }
    }
}
