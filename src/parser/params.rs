//! Fixed-capacity storage for CSI/DCS parameters, including DEC subparameters
//! (the colon-separated values used by extended SGR color specs like
//! `38:2::R:G:B`).

/// Maximum number of parameter slots a single CSI/DCS sequence may carry.
/// Additional parameters beyond this set the parser's `ignoring` flag.
pub const MAX_PARAMS: usize = 32;

/// A CSI/DCS parameter list.
///
/// Values are stored flat; each value is either a *primary* (started by `;`
/// or the first value after entry) or an *extension* (subparameter, started
/// by `:`) of the primary immediately before it. [`Params::iter`] groups
/// consecutive extensions with their primary so callers see one slice per
/// logical parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Params {
  values: [u16; MAX_PARAMS],
  is_extension: [bool; MAX_PARAMS],
  len: usize,
}

impl Default for Params {
  fn default() -> Self {
    Params { values: [0; MAX_PARAMS], is_extension: [false; MAX_PARAMS], len: 0 }
  }
}

impl Params {
  pub fn new() -> Self { Self::default() }

  /// Number of logical (primary) parameters, not counting subparameters.
  pub fn len(&self) -> usize { self.iter().count() }

  pub fn is_empty(&self) -> bool { self.len == 0 }

  pub fn is_full(&self) -> bool { self.len == MAX_PARAMS }

  pub fn clear(&mut self) { self.len = 0; }

  /// Push `value` as a new primary parameter. No-op (caller should have
  /// already checked [`Params::is_full`]) if the container is full.
  pub fn push(&mut self, value: u16) {
    if self.is_full() {
      return;
    }
    self.values[self.len] = value;
    self.is_extension[self.len] = false;
    self.len += 1;
  }

  /// Push `value` as a subparameter of the most recently pushed primary.
  pub fn extend(&mut self, value: u16) {
    if self.is_full() {
      return;
    }
    self.values[self.len] = value;
    self.is_extension[self.len] = self.len > 0;
    self.len += 1;
  }

  pub fn iter(&self) -> ParamsIter<'_> { ParamsIter { params: self, idx: 0 } }

  /// The `i`-th logical parameter's full slice (primary + subparameters), if present.
  pub fn get(&self, i: usize) -> Option<&[u16]> { self.iter().nth(i) }

  /// The primary value of the `i`-th logical parameter, or `default` when
  /// absent or explicitly `0` (CSI parameters use `0` to mean "omitted").
  pub fn get_single(&self, i: usize, default: u16) -> u16 {
    match self.get(i) {
      Some([first, ..]) if *first != 0 => *first,
      _ => default,
    }
  }
}

pub struct ParamsIter<'a> {
  params: &'a Params,
  idx: usize,
}

impl<'a> Iterator for ParamsIter<'a> {
  type Item = &'a [u16];

  fn next(&mut self) -> Option<Self::Item> {
    if self.idx >= self.params.len {
      return None;
    }
    let start = self.idx;
    let mut end = start + 1;
    while end < self.params.len && self.params.is_extension[end] {
      end += 1;
    }
    self.idx = end;
    Some(&self.params.values[start..end])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn groups_subparameters_with_their_primary() {
    let mut p = Params::new();
    p.push(38);
    p.extend(2);
    p.extend(255);
    p.extend(0);
    p.extend(0);
    p.push(1);

    let groups: Vec<&[u16]> = p.iter().collect();
    assert_eq!(groups, vec![&[38, 2, 255, 0, 0][..], &[1][..]]);
    assert_eq!(p.len(), 2);
  }

  #[test]
  fn get_single_defaults_on_zero_or_missing() {
    let mut p = Params::new();
    p.push(0);
    p.push(5);

    assert_eq!(p.get_single(0, 1), 1);
    assert_eq!(p.get_single(1, 1), 5);
    assert_eq!(p.get_single(2, 7), 7);
  }

  #[test]
  fn overflow_is_a_silent_no_op() {
    let mut p = Params::new();
    for i in 0..MAX_PARAMS {
      p.push(i as u16);
    }
    assert!(p.is_full());
    p.push(999);
    assert_eq!(p.len(), MAX_PARAMS);
    assert_eq!(p.get_single(0, 0), 0);
  }
}
