/// Deterministic seatings: `order[seat]` is the agent index sitting there.
pub struct SeatPermutations {
    permutations: Vec<Vec<usize>>,
}

impl SeatPermutations {
    /// The first `count` orderings of `seats` agents, identity first.
    pub fn new(seats: usize, count: usize) -> Self {
        let limit = count.min(max_permutations(seats));
        let mut permutations = Vec::with_capacity(limit);
        let mut base: Vec<usize> = (0..seats).collect();
        generate(&mut base, 0, limit, &mut permutations);
        Self { permutations }
    }

    pub fn as_slice(&self) -> &[Vec<usize>] {
        &self.permutations
    }
}

/// `seats!`
pub fn max_permutations(seats: usize) -> usize {
    (1..=seats).product::<usize>().max(1)
}

fn generate(data: &mut [usize], start: usize, limit: usize, output: &mut Vec<Vec<usize>>) {
    if output.len() >= limit {
        return;
    }

    if start + 1 >= data.len() {
        output.push(data.to_vec());
        return;
    }

    for idx in start..data.len() {
        data.swap(start, idx);
        generate(data, start + 1, limit, output);
        data.swap(start, idx);
        if output.len() >= limit {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_comes_first() {
        let perms = SeatPermutations::new(3, 1);
        assert_eq!(perms.as_slice(), &[vec![0, 1, 2]]);
    }

    #[test]
    fn caps_at_factorial() {
        assert_eq!(SeatPermutations::new(3, 100).as_slice().len(), 6);
        assert_eq!(max_permutations(5), 120);
    }

    #[test]
    fn orderings_are_distinct() {
        let mut seen = SeatPermutations::new(4, 24).as_slice().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 24);
    }
}
