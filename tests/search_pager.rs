mod common;

use common::ranked;
use winstreak_board::pager::{max_page, page, PageRequest, Pager, DEFAULT_MAX_PAGE};
use winstreak_board::player::Player;
use winstreak_board::search::apply_filter;

fn steve_roster() -> Vec<Player> {
    // 25 "Steve" variants interleaved with 15 other names.
    let mut names = Vec::new();
    for i in 0..40 {
        if i % 8 < 5 {
            names.push(format!("xSteve{i}"));
        } else {
            names.push(format!("Alex{i}"));
        }
    }
    let pairs: Vec<(&str, u64)> = names
        .iter()
        .enumerate()
        .map(|(idx, n)| (n.as_str(), 1000 - idx as u64))
        .collect();
    ranked(&pairs)
}

#[test]
fn blank_term_returns_roster_untouched() {
    let roster = steve_roster();
    for term in ["", "   ", "\t"] {
        let list = apply_filter(&roster, term);
        assert_eq!(list.len(), roster.len());
        assert!(list.iter().zip(&roster).all(|(a, b)| *a == b));
    }
}

#[test]
fn filter_is_case_insensitive_substring_in_rank_order() {
    let roster = steve_roster();
    let list = apply_filter(&roster, "STEVE");
    let expected: Vec<&Player> = roster
        .iter()
        .filter(|p| p.name.to_lowercase().contains("steve"))
        .collect();
    assert_eq!(list, expected);
    assert_eq!(list.len(), 25);
    assert!(list.windows(2).all(|w| w[0].global_rank < w[1].global_rank));
    assert!(apply_filter(&roster, "nobody").is_empty());
}

#[test]
fn search_then_page_scenario() {
    let roster = steve_roster();
    let list = apply_filter(&roster, "Steve");

    let first = page(&list, 1, 10);
    assert_eq!(first.items.len(), 10);
    assert!(first.has_more);
    assert_eq!(first.max_page, 3);
    assert_eq!(first.items[0].name, list[0].name);

    let third = page(&list, 3, 10);
    assert_eq!(third.items.len(), 5);
    assert!(!third.has_more);
    assert_eq!(third.start, 20);
    assert_eq!(third.items[4].name, list[24].name);
}

#[test]
fn max_page_defaults_when_empty() {
    assert_eq!(max_page(0, 10), DEFAULT_MAX_PAGE);
    assert_eq!(max_page(1, 10), 1);
    assert_eq!(max_page(10, 10), 1);
    assert_eq!(max_page(11, 10), 2);
    assert_eq!(max_page(100, 10), 10);
}

#[test]
fn empty_list_pages_to_empty_slice() {
    let list: Vec<Player> = Vec::new();
    let view = page(&list, 1, 10);
    assert!(view.items.is_empty());
    assert!(!view.has_more);
    assert_eq!(view.max_page, DEFAULT_MAX_PAGE);
}

#[test]
fn page_never_exceeds_bounds() {
    let list: Vec<u32> = (0..23).collect();
    let view = page(&list, 99, 10);
    assert_eq!(view.page, 3);
    assert_eq!(view.items, &[20, 21, 22]);
    let view = page(&list, 0, 10);
    assert_eq!(view.page, 1);
}

#[test]
fn pager_rejects_out_of_range_requests() {
    let mut pager = Pager::new(10);
    assert!(!pager.change(PageRequest::Prev, 25));
    assert!(!pager.change(PageRequest::Jump(0), 25));
    assert!(!pager.change(PageRequest::Jump(4), 25));
    assert_eq!(pager.page(), 1);

    assert!(pager.change(PageRequest::Next, 25));
    assert!(pager.change(PageRequest::Next, 25));
    assert_eq!(pager.page(), 3);
    assert!(!pager.change(PageRequest::Next, 25), "max_page + 1 is a no-op");
    assert_eq!(pager.page(), 3);

    assert!(pager.change(PageRequest::Jump(1), 25));
    assert_eq!(pager.page(), 1);
}

#[test]
fn pager_allows_default_pages_before_first_load() {
    let mut pager = Pager::new(10);
    assert!(pager.change(PageRequest::Jump(DEFAULT_MAX_PAGE), 0));
    assert!(!pager.change(PageRequest::Next, 0));
    pager.clamp(15);
    assert_eq!(pager.page(), 2);
}
