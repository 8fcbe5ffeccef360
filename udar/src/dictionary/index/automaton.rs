//! 最小非巡回決定性オートマトン（DAWG）
//!
//! このモジュールは、文字列からペイロードIDへの対応を保持する最小DAWGを提供します。
//! キーは昇順に挿入され、確定した状態は状態レジストリによって同形の状態と共有されます。
//! 共通の接尾辞とペイロードを持つキーは、同じ状態列を共有します。
//!
//! 遷移ラベルはUnicodeのコードポイントで、各状態の遷移はラベル順に並んでいます。

use hashbrown::HashMap;
use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::{Result, UdarError};
use crate::utils::FromU32;

/// 終状態でないことを示す値
const NO_VALUE: u32 = u32::MAX;

/// 状態
#[derive(Archive, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct State {
    first_edge: u32,
    num_edges: u32,
    value: u32,
}

/// 遷移
#[derive(Archive, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    label: u32,
    target: u32,
}

/// 確定済みのオートマトン
#[derive(Archive, Serialize, Deserialize)]
pub struct Automaton {
    states: Vec<State>,
    edges: Vec<Edge>,
    root: u32,
    num_keys: u32,
}

/// 所有版とアーカイブ版のオートマトンに共通する読み出し操作
trait Graph {
    fn root(&self) -> u32;

    /// `(first_edge, num_edges, value)`
    fn state(&self, id: u32) -> Option<(u32, u32, u32)>;

    /// `(label, target)`
    fn edge(&self, idx: u32) -> Option<(u32, u32)>;
}

impl Graph for Automaton {
    #[inline(always)]
    fn root(&self) -> u32 {
        self.root
    }

    #[inline(always)]
    fn state(&self, id: u32) -> Option<(u32, u32, u32)> {
        self.states
            .get(usize::from_u32(id))
            .map(|s| (s.first_edge, s.num_edges, s.value))
    }

    #[inline(always)]
    fn edge(&self, idx: u32) -> Option<(u32, u32)> {
        self.edges
            .get(usize::from_u32(idx))
            .map(|e| (e.label, e.target))
    }
}

impl Graph for ArchivedAutomaton {
    #[inline(always)]
    fn root(&self) -> u32 {
        self.root.to_native()
    }

    #[inline(always)]
    fn state(&self, id: u32) -> Option<(u32, u32, u32)> {
        self.states.get(usize::from_u32(id)).map(|s| {
            (
                s.first_edge.to_native(),
                s.num_edges.to_native(),
                s.value.to_native(),
            )
        })
    }

    #[inline(always)]
    fn edge(&self, idx: u32) -> Option<(u32, u32)> {
        self.edges
            .get(usize::from_u32(idx))
            .map(|e| (e.label.to_native(), e.target.to_native()))
    }
}

fn transition<G: Graph + ?Sized>(g: &G, state: u32, label: u32) -> Option<u32> {
    let (first, num, _) = g.state(state)?;
    let (mut lo, mut hi) = (0, num);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let (l, target) = g.edge(first.checked_add(mid)?)?;
        match l.cmp(&label) {
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid,
            std::cmp::Ordering::Equal => return Some(target),
        }
    }
    None
}

fn walk<G: Graph + ?Sized>(g: &G, key: &str) -> Option<u32> {
    key.chars()
        .try_fold(g.root(), |state, c| transition(g, state, u32::from(c)))
}

fn value_of<G: Graph + ?Sized>(g: &G, state: u32) -> Option<u32> {
    g.state(state)
        .map(|(_, _, v)| v)
        .filter(|&v| v != NO_VALUE)
}

fn get<G: Graph + ?Sized>(g: &G, key: &str) -> Option<u32> {
    walk(g, key).and_then(|s| value_of(g, s))
}

fn common_prefix_len<G: Graph + ?Sized>(g: &G, input: &str) -> usize {
    let mut state = g.root();
    let mut len = 0;
    for c in input.chars() {
        match transition(g, state, u32::from(c)) {
            Some(next) => state = next,
            None => break,
        }
        len += 1;
    }
    len
}

fn common_prefix_iter<'a, G: Graph + ?Sized>(
    g: &'a G,
    input: &'a str,
) -> impl Iterator<Item = (usize, u32)> + 'a {
    let mut chars = input.chars();
    let mut state = Some(g.root());
    let mut end_char = 0;
    let mut root_checked = false;
    std::iter::from_fn(move || {
        if !root_checked {
            root_checked = true;
            if let Some(v) = state.and_then(|s| value_of(g, s)) {
                return Some((0, v));
            }
        }
        loop {
            let s = state?;
            let c = chars.next()?;
            state = transition(g, s, u32::from(c));
            end_char += 1;
            if let Some(v) = state.and_then(|s| value_of(g, s)) {
                return Some((end_char, v));
            }
        }
    })
}

/// 辞書順にキーを列挙するイテレータ
struct Keys<'a, G: ?Sized> {
    graph: &'a G,
    stack: Vec<(u32, u32)>,
    key: String,
    pending: Option<(String, u32)>,
}

impl<'a, G: Graph + ?Sized> Keys<'a, G> {
    fn new(graph: &'a G, prefix: &str) -> Self {
        let mut keys = Self {
            graph,
            stack: vec![],
            key: prefix.to_string(),
            pending: None,
        };
        if let Some(start) = walk(graph, prefix) {
            keys.stack.push((start, 0));
            keys.pending = value_of(graph, start).map(|v| (prefix.to_string(), v));
        }
        keys
    }
}

impl<G: Graph + ?Sized> Iterator for Keys<'_, G> {
    type Item = (String, u32);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.take() {
                return Some(item);
            }
            let frame = self.stack.last_mut()?;
            let (state, next_edge) = *frame;
            let (first, num, _) = self.graph.state(state)?;
            if next_edge < num {
                frame.1 += 1;
                let (label, target) = self.graph.edge(first.checked_add(next_edge)?)?;
                self.key
                    .push(char::from_u32(label).unwrap_or(char::REPLACEMENT_CHARACTER));
                self.stack.push((target, 0));
                self.pending = value_of(self.graph, target).map(|v| (self.key.clone(), v));
            } else {
                self.stack.pop();
                if !self.stack.is_empty() {
                    self.key.pop();
                }
            }
        }
    }
}

impl Automaton {
    /// キーに対応する値を返します。
    #[inline(always)]
    pub fn get(&self, key: &str) -> Option<u32> {
        get(self, key)
    }

    /// 入力の先頭から遷移できる最長の文字数を返します。
    #[inline(always)]
    pub fn common_prefix_len(&self, input: &str) -> usize {
        common_prefix_len(self, input)
    }

    /// 入力の接頭辞のうちキーとして登録されているものを、
    /// `(文字数, 値)`の組として短い順に返します。
    #[inline(always)]
    pub fn common_prefix_iter<'a>(
        &'a self,
        input: &'a str,
    ) -> impl Iterator<Item = (usize, u32)> + 'a {
        common_prefix_iter(self, input)
    }

    /// 指定した接頭辞で始まるキーを辞書順に返します。
    pub fn predictive_iter<'a>(
        &'a self,
        prefix: &str,
    ) -> impl Iterator<Item = (String, u32)> + use<'a> {
        Keys::new(self, prefix)
    }

    /// すべてのキーを辞書順に返します。
    pub fn iter(&self) -> impl Iterator<Item = (String, u32)> + '_ {
        Keys::new(self, "")
    }

    /// 登録されているキーの数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        usize::from_u32(self.num_keys)
    }

    /// キーが登録されていないかどうかを返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.num_keys == 0
    }

    /// 状態数を返します。
    #[inline(always)]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// 遷移数を返します。
    #[inline(always)]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

impl ArchivedAutomaton {
    /// キーに対応する値を返します（アーカイブ版）。
    #[inline(always)]
    pub fn get(&self, key: &str) -> Option<u32> {
        get(self, key)
    }

    /// 入力の先頭から遷移できる最長の文字数を返します（アーカイブ版）。
    #[inline(always)]
    pub fn common_prefix_len(&self, input: &str) -> usize {
        common_prefix_len(self, input)
    }

    #[inline(always)]
    pub fn common_prefix_iter<'a>(
        &'a self,
        input: &'a str,
    ) -> impl Iterator<Item = (usize, u32)> + 'a {
        common_prefix_iter(self, input)
    }

    pub fn predictive_iter<'a>(
        &'a self,
        prefix: &str,
    ) -> impl Iterator<Item = (String, u32)> + use<'a> {
        Keys::new(self, prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, u32)> + '_ {
        Keys::new(self, "")
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        usize::from_u32(self.num_keys.to_native())
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.num_keys.to_native() == 0
    }

    #[inline(always)]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    #[inline(always)]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

/// 未確定の状態
struct PendingState {
    edges: Vec<(u32, u32)>,
    value: u32,
}

impl PendingState {
    const fn new() -> Self {
        Self {
            edges: vec![],
            value: NO_VALUE,
        }
    }
}

/// [`Automaton`]を構築するビルダー
///
/// キーは辞書順（コードポイント順）に厳密に増加する順序で挿入する必要があります。
/// 直前のキーと共有しない部分の状態は、次の挿入時にレジストリへ登録されて確定します。
pub struct AutomatonBuilder {
    states: Vec<State>,
    edges: Vec<Edge>,
    registry: HashMap<(u32, Vec<(u32, u32)>), u32>,
    root: PendingState,
    // Unfrozen path of the last inserted key, paired with the label leading into each state.
    stack: Vec<(u32, PendingState)>,
    last_key: Option<String>,
    num_keys: u32,
}

impl Default for AutomatonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomatonBuilder {
    /// 新しいビルダーを作成します。
    pub fn new() -> Self {
        Self {
            states: vec![],
            edges: vec![],
            registry: HashMap::new(),
            root: PendingState::new(),
            stack: vec![],
            last_key: None,
            num_keys: 0,
        }
    }

    /// キーと値を挿入します。
    ///
    /// # 引数
    ///
    /// * `key` - 挿入するキー
    /// * `value` - キーに対応する値（`u32::MAX`は使用できません）
    ///
    /// # エラー
    ///
    /// キーが直前に挿入したキー以下の場合、または値が`u32::MAX`の場合に
    /// [`UdarError::InvalidArgument`]を返します。
    pub fn insert(&mut self, key: &str, value: u32) -> Result<()> {
        if value == NO_VALUE {
            return Err(UdarError::invalid_argument(
                "value",
                "u32::MAX is reserved for non-final states",
            ));
        }
        if self.num_keys == u32::MAX {
            return Err(UdarError::capacity(
                "number of keys",
                usize::from_u32(self.num_keys),
                usize::from_u32(u32::MAX),
            ));
        }
        let prefix_len = match &self.last_key {
            Some(last) if key <= last.as_str() => {
                return Err(UdarError::invalid_argument(
                    "key",
                    format!(
                        "keys must be inserted in strictly increasing order, {:?} after {:?}",
                        key, last
                    ),
                ));
            }
            Some(last) => last
                .chars()
                .zip(key.chars())
                .take_while(|(a, b)| a == b)
                .count(),
            None => 0,
        };

        self.freeze_to(prefix_len)?;
        for c in key.chars().skip(prefix_len) {
            self.stack.push((u32::from(c), PendingState::new()));
        }
        self.tail_mut().value = value;

        self.last_key = Some(key.to_string());
        self.num_keys += 1;
        Ok(())
    }

    /// 挿入済みのキーの数を返します。
    pub fn len(&self) -> usize {
        usize::from_u32(self.num_keys)
    }

    /// キーがまだ挿入されていないかどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.num_keys == 0
    }

    /// 残りの状態を確定し、[`Automaton`]を構築します。
    pub fn finish(mut self) -> Result<Automaton> {
        self.freeze_to(0)?;
        let root = std::mem::replace(&mut self.root, PendingState::new());
        let root = self.register(root)?;
        log::debug!(
            "[udar] automaton: {} keys, {} states, {} edges",
            self.num_keys,
            self.states.len(),
            self.edges.len()
        );
        Ok(Automaton {
            states: self.states,
            edges: self.edges,
            root,
            num_keys: self.num_keys,
        })
    }

    fn tail_mut(&mut self) -> &mut PendingState {
        match self.stack.last_mut() {
            Some((_, state)) => state,
            None => &mut self.root,
        }
    }

    fn freeze_to(&mut self, depth: usize) -> Result<()> {
        while self.stack.len() > depth {
            let Some((label, state)) = self.stack.pop() else {
                break;
            };
            let id = self.register(state)?;
            self.tail_mut().edges.push((label, id));
        }
        Ok(())
    }

    fn register(&mut self, state: PendingState) -> Result<u32> {
        let signature = (state.value, state.edges);
        if let Some(&id) = self.registry.get(&signature) {
            return Ok(id);
        }
        let id = u32::try_from(self.states.len())?;
        let first_edge = u32::try_from(self.edges.len())?;
        let num_edges = u32::try_from(signature.1.len())?;
        self.edges.extend(
            signature
                .1
                .iter()
                .map(|&(label, target)| Edge { label, target }),
        );
        self.states.push(State {
            first_edge,
            num_edges,
            value: signature.0,
        });
        self.registry.insert(signature, id);
        Ok(id)
    }
}
