use std::collections::{HashMap, HashSet};

/// Sequences at least this long have their most common lines treated as
/// "popular" and excluded from match seeding.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Kind of an edit operation between two sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// `a[a_start..a_end]` relates to `b[b_start..b_end]` as described by `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

/// A run of `size` equal elements at `a[a]` and `b[b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Match {
    a: usize,
    b: usize,
    size: usize,
}

/// Longest-matching-block line matcher.
///
/// Finds the longest contiguous matching run, then recurses on the pieces
/// to its left and right. This yields the same hunks as the classic
/// Ratcliff/Obershelp based unified diff, which matters because diff
/// output is compared byte for byte by users and scripts.
pub struct SequenceMatcher<'a> {
    a: &'a [String],
    b: &'a [String],
    /// Positions of every non-popular line of `b`, ascending.
    b2j: HashMap<&'a str, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    pub fn new(a: &'a [String], b: &'a [String]) -> Self {
        let mut b2j: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (j, line) in b.iter().enumerate() {
            b2j.entry(line.as_str()).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<&str> = b2j
                .iter()
                .filter(|(_, positions)| positions.len() > limit)
                .map(|(line, _)| *line)
                .collect();
            b2j.retain(|line, _| !popular.contains(line));
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn find_longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> Match {
        let mut best = Match {
            a: a_lo,
            b: b_lo,
            size: 0,
        };
        // j2len[j] = length of the match ending at a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in a_lo..a_hi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(self.a[i].as_str()) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best.size {
                        best = Match {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next_j2len;
        }

        // Popular lines never seed a match but may still extend one.
        while best.a > a_lo && best.b > b_lo && self.a[best.a - 1] == self.b[best.b - 1] {
            best.a -= 1;
            best.b -= 1;
            best.size += 1;
        }
        while best.a + best.size < a_hi
            && best.b + best.size < b_hi
            && self.a[best.a + best.size] == self.b[best.b + best.size]
        {
            best.size += 1;
        }

        best
    }

    /// All matching blocks, ascending, adjacent blocks merged, terminated
    /// by a zero-size sentinel at `(a.len(), b.len())`.
    fn matching_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
            let m = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if a_lo < m.a && b_lo < m.b {
                queue.push((a_lo, m.a, b_lo, m.b));
            }
            if m.a + m.size < a_hi && m.b + m.size < b_hi {
                queue.push((m.a + m.size, a_hi, m.b + m.size, b_hi));
            }
        }
        blocks.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Match {
            a: self.a.len(),
            b: self.b.len(),
            size: 0,
        });
        merged
    }

    /// Edit operations turning `a` into `b`.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut i = 0;
        let mut j = 0;
        let mut codes = Vec::new();

        for m in self.matching_blocks() {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                codes.push(Opcode {
                    tag,
                    a_start: i,
                    a_end: m.a,
                    b_start: j,
                    b_end: m.b,
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                codes.push(Opcode {
                    tag: Tag::Equal,
                    a_start: m.a,
                    a_end: i,
                    b_start: m.b,
                    b_end: j,
                });
            }
        }
        codes
    }

    /// Opcodes grouped into hunks with up to `context` lines of context.
    ///
    /// Identical inputs produce no groups.
    pub fn grouped_opcodes(&self, context: usize) -> Vec<Vec<Opcode>> {
        let mut codes = self.opcodes();
        if codes.is_empty() {
            codes.push(Opcode {
                tag: Tag::Equal,
                a_start: 0,
                a_end: 1,
                b_start: 0,
                b_end: 1,
            });
        }

        // Trim leading and trailing context.
        if let Some(first) = codes.first_mut()
            && first.tag == Tag::Equal
        {
            first.a_start = first.a_start.max(first.a_end.saturating_sub(context));
            first.b_start = first.b_start.max(first.b_end.saturating_sub(context));
        }
        if let Some(last) = codes.last_mut()
            && last.tag == Tag::Equal
        {
            last.a_end = last.a_end.min(last.a_start + context);
            last.b_end = last.b_end.min(last.b_start + context);
        }

        let mut groups = Vec::new();
        let mut group = Vec::new();
        for mut code in codes {
            // Split long equal runs into the tail of one hunk and the head
            // of the next.
            if code.tag == Tag::Equal && code.a_end - code.a_start > 2 * context {
                group.push(Opcode {
                    a_end: code.a_end.min(code.a_start + context),
                    b_end: code.b_end.min(code.b_start + context),
                    ..code
                });
                groups.push(std::mem::take(&mut group));
                code.a_start = code.a_start.max(code.a_end.saturating_sub(context));
                code.b_start = code.b_start.max(code.b_end.saturating_sub(context));
            }
            group.push(code);
        }

        let only_equal = group.len() == 1 && group[0].tag == Tag::Equal;
        if !group.is_empty() && !only_equal {
            groups.push(group);
        }
        groups
    }
}
