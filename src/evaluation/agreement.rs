//! Agreement calculator: Cohen's kappa for two raters over categorical labels.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::common::error::{DiagError, DiagResult};

use super::domain::{ContingencyTable, Interpretation, KappaInput, KappaResult};
use super::interval::z_for_confidence;

/// Cross-tabulate two equally long label sequences.
///
/// Categories are the distinct labels seen by either rater, in lexicographic order.
pub fn contingency_table(rater1: &[String], rater2: &[String]) -> DiagResult<ContingencyTable> {
    if rater1.len() != rater2.len() {
        return Err(DiagError::LengthMismatch {
            rater1: rater1.len(),
            rater2: rater2.len(),
        });
    }
    if rater1.is_empty() {
        return Err(DiagError::EmptyInput);
    }

    let categories: BTreeSet<&String> = rater1.iter().chain(rater2).collect();
    let index: BTreeMap<&String, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, label)| (*label, i))
        .collect();

    let k = categories.len();
    let mut counts = vec![vec![0u64; k]; k];
    for (a, b) in rater1.iter().zip(rater2) {
        counts[index[a]][index[b]] += 1;
    }

    Ok(ContingencyTable {
        categories: categories.into_iter().cloned().collect(),
        counts,
    })
}

/// Compute Cohen's kappa, its normal-approximation interval and interpretation band.
///
/// Fails with [`DiagError::DegenerateAgreement`] when chance agreement is 1,
/// i.e. both raters used one and the same category throughout.
pub fn cohens_kappa(input: &KappaInput) -> DiagResult<KappaResult> {
    let table = contingency_table(&input.rater1, &input.rater2)?;
    let z = z_for_confidence(input.confidence_level)?;
    // One shared category makes chance agreement exactly 1.
    if table.categories.len() == 1 {
        return Err(DiagError::DegenerateAgreement {
            category: table.categories[0].clone(),
        });
    }

    let n = table.n();
    let nf = n as f64;
    let p_o = table.diagonal() as f64 / nf;
    let p_e = (0..table.categories.len())
        .map(|c| table.row_total(c) as f64 * table.column_total(c) as f64)
        .sum::<f64>()
        / (nf * nf);

    let kappa = ((p_o - p_e) / (1.0 - p_e)).clamp(-1.0, 1.0);
    let se = (p_o * (1.0 - p_o) / (nf * (1.0 - p_e).powi(2))).sqrt();

    info!(n, k = table.categories.len(), kappa, "kappa computed");

    Ok(KappaResult {
        kappa,
        ci_lower: (kappa - z * se).clamp(-1.0, 1.0),
        ci_upper: (kappa + z * se).clamp(-1.0, 1.0),
        observed_agreement: p_o,
        expected_agreement: p_e,
        sample_size: n,
        interpretation: Interpretation::from_kappa(kappa),
        confidence_level: input.confidence_level,
        description: input.description.clone(),
    })
}
