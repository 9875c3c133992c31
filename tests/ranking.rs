use winstreak_board::player::{rank_players, Player, Variant, ROSTER_CAP};

fn roster(streaks: &[u64]) -> Vec<Player> {
    streaks
        .iter()
        .enumerate()
        .map(|(idx, ws)| Player::new(format!("p{idx}"), *ws, 0))
        .collect()
}

#[test]
fn ranks_are_contiguous_and_metric_descends() {
    let ranked = rank_players(roster(&[3, 9, 1, 9, 0, 4, 4, 7]), Variant::Current);
    for (idx, player) in ranked.iter().enumerate() {
        assert_eq!(player.global_rank, idx + 1);
    }
    for pair in ranked.windows(2) {
        assert!(pair[0].winstreak >= pair[1].winstreak);
    }
}

#[test]
fn ties_keep_input_order() {
    let ranked = rank_players(roster(&[5, 7, 5, 7, 5]), Variant::Current);
    let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["p1", "p3", "p0", "p2", "p4"]);
}

#[test]
fn cap_applies_to_the_first_hundred_input_records() {
    let mut streaks: Vec<u64> = (0..ROSTER_CAP as u64).collect();
    // Records past the cap never appear, however large their metric.
    streaks.extend(std::iter::repeat(10_000).take(50));
    let ranked = rank_players(roster(&streaks), Variant::Current);

    assert_eq!(ranked.len(), ROSTER_CAP);
    assert!(ranked.iter().all(|p| p.winstreak < 10_000));
    assert_eq!(ranked[0].name, "p99");
    assert_eq!(ranked[ROSTER_CAP - 1].global_rank, ROSTER_CAP);
}

#[test]
fn highest_variant_uses_highest_winstreak() {
    let players = vec![
        Player::new("a", 50, 60),
        Player::new("b", 10, 90),
        Player::new("c", 70, 70),
    ];
    let ranked = rank_players(players, Variant::Highest);
    let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["b", "c", "a"]);
}

#[test]
fn empty_roster_ranks_to_empty() {
    assert!(rank_players(Vec::new(), Variant::Current).is_empty());
}
