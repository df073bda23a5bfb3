use std::collections::HashMap;

use crate::core::contig::Contig;

/// Reference genome loaded from FASTA, indexed by contig name
#[derive(Debug, Clone, Default)]
pub struct Reference {
    contigs: Vec<Contig>,
    by_name: HashMap<String, usize>,
}

impl Reference {
    /// Build a reference from contigs, re-numbering them in the given order.
    /// A repeated name keeps its first sequence.
    pub fn new(contigs: Vec<Contig>) -> Self {
        let mut reference = Self::default();
        for contig in contigs {
            reference.push(contig);
        }
        reference
    }

    fn push(&mut self, mut contig: Contig) {
        if self.by_name.contains_key(&contig.name) {
            tracing::warn!(contig = %contig.name, "Duplicate contig in reference, keeping the first");
            return;
        }
        contig.index = self.contigs.len();
        self.by_name.insert(contig.name.clone(), contig.index);
        self.contigs.push(contig);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Contig> {
        self.by_name.get(name).map(|&i| &self.contigs[i])
    }

    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}
