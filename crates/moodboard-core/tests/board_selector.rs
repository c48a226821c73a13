use moodboard_core::prelude::*;

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[test]
fn windows_wrap_around_the_catalog() {
    let (len, batch) = (7, 3);
    let mut index = 0;
    let mut windows = Vec::new();
    for _ in 0..4 {
        let w = next_window(index, batch, len);
        assert_eq!(w.count, batch);
        windows.push(w.indices().collect::<Vec<_>>());
        index = advance(index, batch, len);
    }
    assert_eq!(
        windows,
        vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 0, 1], vec![2, 3, 4]]
    );
}

#[test]
fn advance_then_retreat_restores_index() {
    for len in 1..=12 {
        for batch in 1..=15 {
            for start in 0..len {
                let fwd = advance(start, batch, len);
                assert!(fwd < len);
                assert_eq!(retreat(fwd, batch, len), start, "len={len} batch={batch}");
                let back = retreat(start, batch, len);
                assert_eq!(advance(back, batch, len), start);
            }
        }
    }
}

#[test]
fn advancing_closes_the_cycle() {
    for len in 1..=20 {
        for batch in 1..=20 {
            let period = len / gcd(batch, len);
            let mut index = 0;
            for step in 1..=period {
                index = advance(index, batch, len);
                if step < period {
                    assert_ne!(index, 0, "len={len} batch={batch} step={step}");
                }
            }
            assert_eq!(index, 0, "len={len} batch={batch}");
        }
    }
}

#[test]
fn start_index_is_reduced_modulo_length() {
    let w = next_window(23, 2, 7);
    assert_eq!(w.start_index, 2);
    assert_eq!(w.indices().collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn empty_catalog_yields_empty_window() {
    let w = next_window(0, 3, 0);
    assert!(w.is_empty());
    assert_eq!(w.indices().count(), 0);
}
