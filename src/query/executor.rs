use roaring::RoaringBitmap;

use crate::core::error::Result;
use crate::core::types::DocNum;
use crate::index::reader::IndexReader;
use crate::query::parser::{QueryToken, to_postfix, tokenize_query};

/// Evaluate a postfix token sequence over posting sets.
///
/// Degenerate-operand rule: an operator that finds its operand stack
/// empty substitutes the empty set. For `NOT` this means negating the
/// empty set, which yields the full universe. Malformed queries are
/// therefore answered, never rejected.
pub fn eval_postfix<F>(
    postfix: &[QueryToken],
    mut lookup: F,
    universe: &RoaringBitmap,
) -> Result<RoaringBitmap>
where
    F: FnMut(&str) -> Result<RoaringBitmap>,
{
    let mut stack: Vec<RoaringBitmap> = Vec::new();

    for token in postfix {
        match token {
            QueryToken::Term(term) => stack.push(lookup(term)?),
            QueryToken::Not => {
                let a = pop_operand(&mut stack);
                let mut result = universe.clone();
                result -= a;
                stack.push(result);
            }
            QueryToken::And => {
                let b = pop_operand(&mut stack);
                let mut a = pop_operand(&mut stack);
                a &= b;
                stack.push(a);
            }
            QueryToken::Or => {
                let b = pop_operand(&mut stack);
                let mut a = pop_operand(&mut stack);
                a |= b;
                stack.push(a);
            }
            // Parentheses never survive postfix conversion
            QueryToken::LParen | QueryToken::RParen => {}
        }
    }

    Ok(stack.pop().unwrap_or_default())
}

/// The explicit empty-operand rule of the evaluator.
fn pop_operand(stack: &mut Vec<RoaringBitmap>) -> RoaringBitmap {
    stack.pop().unwrap_or_default()
}

/// Boolean search facade over one index variant.
pub struct Searcher {
    reader: IndexReader,
}

impl Searcher {
    pub fn new(reader: IndexReader) -> Self {
        Searcher { reader }
    }

    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    /// Evaluate a boolean query string to the full, sorted result set.
    /// Pagination is the caller's concern; the set is always computed
    /// completely before any slicing.
    pub fn search(&self, query: &str) -> Result<Vec<DocNum>> {
        let postfix = to_postfix(tokenize_query(query));
        let universe = self.reader.universe();
        let result = eval_postfix(
            &postfix,
            |term| self.term_postings(term),
            &universe,
        )?;
        Ok(result.iter().collect())
    }

    /// Map result docnums to `(docid, title)` pairs via the forward
    /// index, preserving docnum order.
    pub fn resolve(&self, docnums: &[DocNum]) -> Vec<(String, String)> {
        docnums
            .iter()
            .filter_map(|&d| self.reader.doc(d))
            .map(|entry| (entry.docid.clone(), entry.title.clone()))
            .collect()
    }

    /// Posting set for one operand term, retrying with the casefolded
    /// spelling so queries need not match the index case exactly.
    fn term_postings(&self, term: &str) -> Result<RoaringBitmap> {
        let mut docs = self.reader.postings(term)?;
        if docs.is_empty() {
            let lowered = term.to_lowercase();
            if lowered != term {
                docs = self.reader.postings(&lowered)?;
            }
        }
        Ok(docs.into_iter().collect())
    }
}
