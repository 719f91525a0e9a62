//! Begin/end tagged region scanning.
//!
//! Markers are recognized anywhere on a line, so any comment syntax works:
//!
//! ```text
//! // THOTH:BEGIN resource=wal_subsystem id=THOTH-0192
//! ...
//! // THOTH:END id=THOTH-0192
//! ```
//!
//! Attributes are `key=value` tokens in any order; other tokens (comment
//! closers such as `-->` or `*/`) are ignored.

use std::collections::BTreeMap;

use thoth_core::entities::Region;

use crate::error::RegionError;
use crate::hash::{canonicalize, sha256_hex, split_lines};

/// Marker syntax and nesting policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub begin_marker: String,
    pub end_marker: String,
    pub allow_nesting: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            begin_marker: "THOTH:BEGIN".to_string(),
            end_marker: "THOTH:END".to_string(),
            allow_nesting: false,
        }
    }
}

#[derive(Debug)]
struct OpenRegion {
    id: String,
    resource: String,
    /// 0-based index of the BEGIN line.
    begin: usize,
}

#[derive(Debug)]
enum State {
    Closed,
    Open(Vec<OpenRegion>),
}

enum Marker {
    Begin { id: String, resource: String },
    End { id: String },
}

/// Extracts tagged regions from file content.
#[derive(Debug, Clone, Default)]
pub struct RegionScanner {
    options: ScanOptions,
}

impl RegionScanner {
    #[must_use]
    pub const fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan one file. Regions are returned in BEGIN order.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegionError`] in the file; no regions from a file
    /// with an error are reported.
    pub fn scan(&self, file_path: &str, content: &str) -> Result<Vec<Region>, RegionError> {
        let lines = split_lines(content);
        let mut state = State::Closed;
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        let mut regions: Vec<(usize, Region)> = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let Some(marker) = self.parse_marker(line, idx)? else {
                continue;
            };
            match marker {
                Marker::Begin { id, resource } => {
                    if let Some(first) = seen.get(&id) {
                        return Err(RegionError::DuplicateId {
                            id,
                            line: line_no(idx),
                            first: format!("{file_path}:{}", line_no(*first)),
                        });
                    }
                    seen.insert(id.clone(), idx);
                    let open = OpenRegion {
                        id,
                        resource,
                        begin: idx,
                    };
                    state = match state {
                        State::Closed => State::Open(vec![open]),
                        State::Open(mut stack) => {
                            if !self.options.allow_nesting {
                                let current = stack.pop().map(|r| r.id).unwrap_or_default();
                                return Err(RegionError::Nesting {
                                    id: open.id,
                                    open: current,
                                    line: line_no(idx),
                                });
                            }
                            stack.push(open);
                            State::Open(stack)
                        }
                    };
                }
                Marker::End { id } => {
                    let State::Open(mut stack) = state else {
                        return Err(RegionError::UnmatchedEnd {
                            id,
                            expected: None,
                            line: line_no(idx),
                        });
                    };
                    let Some(top) = stack.pop() else {
                        return Err(RegionError::UnmatchedEnd {
                            id,
                            expected: None,
                            line: line_no(idx),
                        });
                    };
                    if top.id != id {
                        return Err(RegionError::UnmatchedEnd {
                            id,
                            expected: Some(top.id),
                            line: line_no(idx),
                        });
                    }
                    let canonical = canonicalize(lines[top.begin + 1..idx].iter().copied());
                    regions.push((
                        top.begin,
                        Region {
                            region_id: top.id,
                            resource_id: top.resource,
                            file_path: file_path.to_string(),
                            start_line: line_no(top.begin),
                            end_line: line_no(idx),
                            canonical_hash: sha256_hex(canonical.as_bytes()),
                            canonical_len: canonical.len() as u64,
                        },
                    ));
                    state = if stack.is_empty() {
                        State::Closed
                    } else {
                        State::Open(stack)
                    };
                }
            }
        }

        if let State::Open(stack) = state
            && let Some(first) = stack.into_iter().next()
        {
            return Err(RegionError::Unterminated {
                id: first.id,
                line: line_no(first.begin),
            });
        }

        regions.sort_by_key(|(begin, _)| *begin);
        Ok(regions.into_iter().map(|(_, r)| r).collect())
    }

    /// Scan many files, enforcing region-id uniqueness across all of them.
    ///
    /// Files are processed in the order given. A file whose region id was
    /// already claimed by an earlier file fails as a whole; the earlier file
    /// keeps its regions.
    pub fn scan_files<'a>(
        &self,
        files: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> (Vec<Region>, Vec<(String, RegionError)>) {
        let mut claimed: BTreeMap<String, String> = BTreeMap::new();
        let mut regions = Vec::new();
        let mut errors = Vec::new();

        for (path, content) in files {
            match self.scan(path, content) {
                Ok(found) => {
                    if let Some(err) = cross_file_duplicate(&found, &claimed) {
                        errors.push((path.to_string(), err));
                        continue;
                    }
                    for r in &found {
                        claimed.insert(
                            r.region_id.clone(),
                            format!("{}:{}", r.file_path, r.start_line),
                        );
                    }
                    regions.extend(found);
                }
                Err(err) => errors.push((path.to_string(), err)),
            }
        }
        (regions, errors)
    }

    fn parse_marker(&self, line: &str, idx: usize) -> Result<Option<Marker>, RegionError> {
        let (begin, end) = (&self.options.begin_marker, &self.options.end_marker);
        let found_begin = line.find(begin.as_str()).map(|pos| (true, pos + begin.len()));
        let found_end = line.find(end.as_str()).map(|pos| (false, pos + end.len()));
        // When one marker contains the other, the longer one is the real match.
        let (is_begin, after) = match (found_begin, found_end) {
            (Some(_), Some(e)) if end.len() > begin.len() => e,
            (Some(b), _) => b,
            (None, Some(e)) => e,
            (None, None) => return Ok(None),
        };
        let rest = &line[after..];

        let mut id = None;
        let mut resource = None;
        for token in rest.split_whitespace() {
            match token.split_once('=') {
                Some(("id", v)) => id = Some(v),
                Some(("resource", v)) => resource = Some(v),
                _ => {}
            }
        }

        let malformed = |reason: &str| RegionError::Malformed {
            line: line_no(idx),
            reason: reason.to_string(),
        };
        let id = id
            .filter(|v| !v.is_empty())
            .ok_or_else(|| malformed("missing id="))?
            .to_string();
        if is_begin {
            let resource = resource
                .filter(|v| !v.is_empty())
                .ok_or_else(|| malformed("missing resource="))?
                .to_string();
            Ok(Some(Marker::Begin { id, resource }))
        } else {
            Ok(Some(Marker::End { id }))
        }
    }
}

fn cross_file_duplicate(
    found: &[Region],
    claimed: &BTreeMap<String, String>,
) -> Option<RegionError> {
    found.iter().find_map(|r| {
        claimed.get(&r.region_id).map(|first| RegionError::DuplicateId {
            id: r.region_id.clone(),
            line: r.start_line,
            first: first.clone(),
        })
    })
}

#[allow(clippy::cast_possible_truncation)]
const fn line_no(idx: usize) -> u32 {
    idx as u32 + 1
}
