use eco_types::{PopulationCounts, PopulationSample};
use std::fmt::Write;

const CSV_HEADER: &str = "tick,bots,humans,ready_patches";

/// Per-tick population series: one sample at construction and one after
/// every completed tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataCollector {
    samples: Vec<PopulationSample>,
}

impl DataCollector {
    pub(crate) fn collect(&mut self, tick: u64, counts: PopulationCounts) {
        self.samples.push(PopulationSample { tick, counts });
    }

    pub(crate) fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn samples(&self) -> &[PopulationSample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&PopulationSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(CSV_HEADER.len() + 1 + self.samples.len() * 16);
        out.push_str(CSV_HEADER);
        out.push('\n');
        for sample in &self.samples {
            let _ = writeln!(
                out,
                "{},{},{},{}",
                sample.tick, sample.counts.bots, sample.counts.humans, sample.counts.ready_patches
            );
        }
        out
    }
}

/// Rebuilds a series from samples recorded elsewhere, such as a saved trace.
impl FromIterator<PopulationSample> for DataCollector {
    fn from_iter<I: IntoIterator<Item = PopulationSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}
