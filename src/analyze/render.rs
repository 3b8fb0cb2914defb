use std::io::Write;

use crate::analyze::{rank_topics, RankedTopic};
use crate::error::Result;

/// Presentation of a topic ranking
pub trait TopicRenderer {
    fn render(&self, topics: &[RankedTopic], out: &mut dyn Write) -> Result<()>;
}

/// Horizontal text bar chart, one line per topic:
///
/// ```text
/// LSA topic counts
/// Topic 1  |################    | 4  cell panel solar
/// Topic 0  |########            | 2  engine piston
/// ```
#[derive(Debug, Clone)]
pub struct TextBarChart {
    pub title: String,
    /// characters of the longest bar
    pub width: usize,
    pub fill: char,
}

impl Default for TextBarChart {
    fn default() -> Self {
        Self {
            title: "LSA topic counts".to_string(),
            width: 40,
            fill: '#',
        }
    }
}

impl TextBarChart {
    fn bar_len(&self, count: usize, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        // round half up
        (count * self.width * 2 + max) / (max * 2)
    }
}

impl TopicRenderer for TextBarChart {
    fn render(&self, topics: &[RankedTopic], out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", self.title)?;
        let max = topics.iter().map(|t| t.count).max().unwrap_or(0);
        let label_width = topics
            .iter()
            .map(|t| format!("Topic {}", t.topic).len())
            .max()
            .unwrap_or(0);
        let count_width = max.to_string().len();

        for t in topics {
            let label = format!("Topic {}", t.topic);
            let bar: String = std::iter::repeat(self.fill).take(self.bar_len(t.count, max)).collect();
            writeln!(
                out,
                "{label:<label_width$} |{bar:<width$}| {count:>count_width$}  {terms}",
                width = self.width,
                count = t.count,
                terms = t.terms.join(" "),
            )?;
        }
        Ok(())
    }
}

/// Rank topics by document count and render them.
///
/// # Arguments
/// * `topic_terms` - top terms of each topic
/// * `topic_counts` - documents per topic
/// * `top_n` - keep only the `n` most populated topics when set and positive
pub fn rank_and_render<R>(
    topic_terms: &[Vec<String>],
    topic_counts: &[usize],
    top_n: Option<usize>,
    renderer: &R,
    out: &mut dyn Write,
) -> Result<Vec<RankedTopic>>
where
    R: TopicRenderer + ?Sized,
{
    let ranked = rank_topics(topic_terms, topic_counts, top_n)?;
    renderer.render(&ranked, out)?;
    Ok(ranked)
}
