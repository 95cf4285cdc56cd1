//! Cycle search over logical module names.

use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

/// Find one cycle reachable from `starts`.
///
/// `successors` yields the modules a module's providing unit requires. The
/// search keeps its own stack, so arbitrarily deep import chains are fine.
/// The returned cycle is rotated to begin at its lexicographically smallest
/// name so the same cycle is always reported the same way.
pub(crate) fn find_cycle<'a, I, F>(starts: I, successors: F) -> Option<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str) -> Vec<&'a str>,
{
    let mut marks: HashMap<&'a str, Mark> = HashMap::new();
    // (node, its successors, index of the next successor to visit)
    let mut stack: Vec<(&'a str, Vec<&'a str>, usize)> = Vec::new();

    for start in starts {
        if marks.contains_key(start) {
            continue;
        }
        marks.insert(start, Mark::OnPath);
        stack.push((start, successors(start), 0));

        while let Some((node, next_nodes, cursor)) = stack.last_mut() {
            let Some(&next) = next_nodes.get(*cursor) else {
                marks.insert(*node, Mark::Done);
                stack.pop();
                continue;
            };
            *cursor += 1;

            match marks.get(next).copied() {
                Some(Mark::Done) => {}
                Some(Mark::OnPath) => {
                    let pos = stack.iter().position(|(n, _, _)| *n == next)?;
                    let cycle = stack[pos..].iter().map(|(n, _, _)| n.to_string()).collect();
                    return Some(canonical(cycle));
                }
                None => {
                    marks.insert(next, Mark::OnPath);
                    stack.push((next, successors(next), 0));
                }
            }
        }
    }
    None
}

fn canonical(mut cycle: Vec<String>) -> Vec<String> {
    let smallest = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle.rotate_left(smallest);
    cycle
}
