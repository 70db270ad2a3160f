// Queue property tests.
//
// Property 1: reverse is an involution.
// Property 2: sort_by agrees with the standard library's stable sort,
//  including the relative order of equal elements.
// Property 3: FIFO model equivalence against VecDeque under random
//  append/remove/reverse/sort sequences.
use chained_table::Queue;
use proptest::prelude::*;
use std::collections::VecDeque;

proptest! {
    #[test]
    fn prop_reverse_involution(items in proptest::collection::vec(any::<i32>(), 0..200)) {
        let mut q: Queue<i32> = items.iter().copied().collect();
        q.reverse();
        let reversed: Vec<i32> = q.iter().copied().collect();
        let mut expected = items.clone();
        expected.reverse();
        prop_assert_eq!(reversed, expected);

        q.reverse();
        prop_assert_eq!(q.iter().copied().collect::<Vec<_>>(), items);
    }

    #[test]
    fn prop_sort_matches_stable_sort(items in proptest::collection::vec((0u8..8, any::<u16>()), 0..200)) {
        let mut q: Queue<(u8, u16)> = items.iter().copied().collect();
        q.sort_by(|a, b| a.0.cmp(&b.0));
        let mut expected = items.clone();
        expected.sort_by(|a, b| a.0.cmp(&b.0));
        prop_assert_eq!(q.iter().copied().collect::<Vec<_>>(), expected);
        prop_assert_eq!(q.len(), items.len());
    }
}

#[derive(Clone, Debug)]
enum Op {
    Append(i16),
    RemoveFront,
    Reverse,
    Sort,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i16>().prop_map(Op::Append),
        2 => Just(Op::RemoveFront),
        1 => Just(Op::Reverse),
        1 => Just(Op::Sort),
    ]
}

proptest! {
    #[test]
    fn prop_fifo_model(ops in proptest::collection::vec(arb_op(), 1..150)) {
        let mut q: Queue<i16> = Queue::new();
        let mut model: VecDeque<i16> = VecDeque::new();
        for op in ops {
            match op {
                Op::Append(v) => {
                    q.append(v);
                    model.push_back(v);
                }
                Op::RemoveFront => prop_assert_eq!(q.remove_front(), model.pop_front()),
                Op::Reverse => {
                    q.reverse();
                    model.make_contiguous().reverse();
                }
                Op::Sort => {
                    q.sort();
                    model.make_contiguous().sort();
                }
            }
            prop_assert_eq!(q.len(), model.len());
            prop_assert_eq!(q.is_empty(), model.is_empty());
            prop_assert_eq!(q.front(), model.front());
            prop_assert!(q.iter().eq(model.iter()));
        }
    }
}
