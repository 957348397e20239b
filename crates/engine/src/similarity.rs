//! Sampled n-gram Jaccard similarity estimate.
//!
//! Cheap prefilter input: strided sampling keeps the cost linear and bounded
//! by `sample_limit` per sequence regardless of document size. These are
//! estimates only, and the floors this feeds are set accordingly low.

use std::collections::HashSet;
use std::hash::Hash;

/// Jaccard estimates for the unigram and bigram sets of a document pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityEstimate {
    pub unigram: f64,
    pub bigram: f64,
}

/// Estimate how similar two token sequences are.
///
/// Samples at most `sample_limit` unigrams and bigrams per sequence, then
/// computes Jaccard similarity per n-gram order.
#[must_use]
pub fn estimate(base: &[&str], comparison: &[&str], sample_limit: usize) -> SimilarityEstimate {
    let unigram = jaccard(
        &sampled_unigrams(base, sample_limit),
        &sampled_unigrams(comparison, sample_limit),
    );
    let bigram = jaccard(
        &sampled_bigrams(base, sample_limit),
        &sampled_bigrams(comparison, sample_limit),
    );
    SimilarityEstimate { unigram, bigram }
}

fn stride_for(len: usize, sample_limit: usize) -> usize {
    ((len + sample_limit - 1) / sample_limit).max(1)
}

fn sampled_unigrams<'a>(tokens: &[&'a str], sample_limit: usize) -> HashSet<&'a str> {
    let mut set = HashSet::new();
    if tokens.is_empty() {
        return set;
    }

    let stride = stride_for(tokens.len(), sample_limit);
    for i in (0..tokens.len()).step_by(stride) {
        let token = tokens[i];
        if !token.is_empty() {
            set.insert(token);
        }
    }
    set
}

fn sampled_bigrams(tokens: &[&str], sample_limit: usize) -> HashSet<String> {
    let mut set = HashSet::new();
    if tokens.is_empty() {
        return set;
    }

    let stride = stride_for(tokens.len(), sample_limit);
    for i in (0..tokens.len().saturating_sub(1)).step_by(stride) {
        let first = tokens[i];
        let second = tokens[i + 1];
        if !first.is_empty() && !second.is_empty() {
            set.insert(format!("{first}|{second}"));
        }
    }
    set
}

/// `|A∩B| / |A∪B|`, iterating the smaller set.
///
/// Two empty sets count as identical (1.0); exactly one empty as disjoint.
fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = smaller.iter().filter(|v| larger.contains(*v)).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
