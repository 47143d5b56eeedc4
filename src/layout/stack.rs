use indexmap::IndexMap;

/// One row's slice of its band's stack.
#[derive(Clone, Debug, PartialEq)]
pub struct StackSegment {
    pub band: String,
    /// Index of the source row.
    pub row: usize,
    pub y0: f64,
    pub y1: f64,
}

impl StackSegment {
    pub fn value(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Groups rows by band (first-seen order) and stacks each band's rows in
/// input order, starting from zero.
pub fn stack<T, B, V>(rows: &[T], band: B, value: V) -> IndexMap<String, Vec<StackSegment>>
where
    B: Fn(&T) -> String,
    V: Fn(&T) -> f64,
{
    let mut bands: IndexMap<String, Vec<StackSegment>> = IndexMap::new();
    for (index, row) in rows.iter().enumerate() {
        let key = band(row);
        let segments = bands.entry(key.clone()).or_default();
        let y0 = segments.last().map_or(0.0, |segment| segment.y1);
        segments.push(StackSegment {
            band: key,
            row: index,
            y0,
            y1: y0 + value(row),
        });
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_accumulate_per_band() {
        let rows = [(1990, "A", 5.0), (1991, "A", 1.0), (1990, "B", 2.0)];
        let bands = stack(&rows, |row| row.0.to_string(), |row| row.2);

        assert_eq!(bands.keys().collect::<Vec<_>>(), ["1990", "1991"]);
        let year = &bands["1990"];
        assert_eq!((year[0].y0, year[0].y1), (0.0, 5.0));
        assert_eq!((year[1].y0, year[1].y1), (5.0, 7.0));
        assert_eq!(year[1].row, 2);
        assert_eq!(bands["1991"][0].value(), 1.0);
    }

    #[test]
    fn empty_rows_make_no_bands() {
        let rows: [(i32, f64); 0] = [];
        assert!(stack(&rows, |row| row.0.to_string(), |row| row.1).is_empty());
    }
}
