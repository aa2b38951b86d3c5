/// Union-find over `0..n` with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            let root = self.find(self.parent[i]);
            self.parent[i] = root;
        }
        self.parent[i]
    }

    /// Merge the sets holding `i` and `j`. Returns false if they were already joined.
    pub fn union(&mut self, i: usize, j: usize) -> bool {
        let (pi, pj) = (self.find(i), self.find(j));
        if pi == pj {
            return false;
        }
        if self.rank[pi] < self.rank[pj] {
            self.parent[pi] = pj;
        } else if self.rank[pi] > self.rank[pj] {
            self.parent[pj] = pi;
        } else {
            self.parent[pj] = pi;
            self.rank[pi] += 1;
        }
        true
    }

    /// All sets, each sorted ascending, ordered by their smallest member.
    pub fn components(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: Vec<Option<usize>> = vec![None; self.len()];
        let mut components: Vec<Vec<usize>> = Vec::new();
        for i in 0..self.len() {
            let root = self.find(i);
            match by_root[root] {
                Some(slot) => components[slot].push(i),
                None => {
                    by_root[root] = Some(components.len());
                    components.push(vec![i]);
                }
            }
        }
        components
    }

    /// The biggest set; on a size tie, the one whose smallest member comes first.
    pub fn largest_component(&mut self) -> Vec<usize> {
        let mut best: Vec<usize> = Vec::new();
        for component in self.components() {
            if component.len() > best.len() {
                best = component;
            }
        }
        best
    }
}
