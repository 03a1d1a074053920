use std::collections::HashMap;
use std::io::{self, Write};

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::domain::{GeneIdType, GeneSet};

/// Ordered gene sets sharing one optional identifier-type tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneSetCollection {
    gene_id_type: Option<GeneIdType>,
    gene_sets: Vec<GeneSet>,
}

impl GeneSetCollection {
    pub fn new(gene_sets: Vec<GeneSet>, gene_id_type: Option<GeneIdType>) -> Self {
        Self {
            gene_id_type,
            gene_sets,
        }
    }

    pub fn gene_id_type(&self) -> Option<&GeneIdType> {
        self.gene_id_type.as_ref()
    }

    pub fn len(&self) -> usize {
        self.gene_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gene_sets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneSet> {
        self.gene_sets.iter()
    }

    /// First gene set carrying `name`.
    pub fn get(&self, name: &str) -> Option<&GeneSet> {
        self.gene_sets.iter().find(|set| set.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.gene_sets.iter().map(|set| set.name.as_str())
    }

    /// Total number of gene identifiers across all sets.
    pub fn gene_count(&self) -> usize {
        self.gene_sets.iter().map(GeneSet::len).sum()
    }

    /// Drops descriptions and the identifier tag. Repeated names collapse,
    /// the later genes replacing the earlier ones.
    pub fn into_mapping(self) -> GeneSetMap {
        let mut map = GeneSetMap::with_capacity(self.gene_sets.len());
        for set in self.gene_sets {
            map.insert(set.name, set.genes);
        }
        map
    }

    pub fn into_gene_sets(self) -> Vec<GeneSet> {
        self.gene_sets
    }

    /// Writes the collection back out as GMT text.
    pub fn write_gmt<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for set in &self.gene_sets {
            writer.write_all(set.name.as_bytes())?;
            writer.write_all(b"\t")?;
            writer.write_all(set.description.as_bytes())?;
            for gene in &set.genes {
                writer.write_all(b"\t")?;
                writer.write_all(gene.as_bytes())?;
            }
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}

impl<'a> IntoIterator for &'a GeneSetCollection {
    type Item = &'a GeneSet;
    type IntoIter = std::slice::Iter<'a, GeneSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.gene_sets.iter()
    }
}

/// Name to genes mapping that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneSetMap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl GeneSetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts or replaces; a replaced key keeps its original position.
    /// Returns the previous genes for `name`, if any.
    pub fn insert(&mut self, name: String, genes: Vec<String>) -> Option<Vec<String>> {
        match self.index.get(&name) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, genes)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, genes));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, genes)| (name.as_str(), genes.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for GeneSetMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, genes) in &self.entries {
            map.serialize_entry(name, genes)?;
        }
        map.end()
    }
}
