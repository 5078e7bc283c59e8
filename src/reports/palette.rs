// Qualitative color palettes (ColorBrewer) for the chart series.

const SET1: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];

const SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Palette {
    /// Saturated colors, used for the attendance series.
    Set1,
    /// Pastel colors, used for the poll answers.
    Set2,
}

impl Palette {
    pub fn all(self) -> &'static [&'static str] {
        match self {
            Palette::Set1 => &SET1,
            Palette::Set2 => &SET2,
        }
    }

    /// The colors for `n` series.
    ///
    /// When more series are requested than the palette holds, colors are reused from the start.
    pub fn colors(self, n: usize) -> Vec<String> {
        self.all()
            .iter()
            .cycle()
            .take(n)
            .map(|c| c.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_of_the_palette() {
        assert_eq!(Palette::Set1.colors(2), vec!["#e41a1c", "#377eb8"]);
        assert_eq!(Palette::Set2.colors(8), Palette::Set2.all().to_vec());
        assert!(Palette::Set2.colors(0).is_empty());
    }

    #[test]
    fn large_requests_cycle() {
        let cs = Palette::Set2.colors(11);
        assert_eq!(cs.len(), 11);
        assert_eq!(cs[8], cs[0]);
        assert_eq!(cs[10], cs[2]);
    }
}
