//! Красно-чёрное дерево страницы поверх массива слотов.
//!
//! Все связи — 10-битные индексы слотов; "нет ребёнка" = слот 0. Слот 0
//! участвует в fixup-операциях как null-объект: запись его полей при
//! сплайсе допустима и учтена форматом.

use crate::key::{FixedKey, KeyRecord};

use super::Page;

impl<K: FixedKey> Page<K> {
    // ---- доступ к полям слотов ----

    #[inline]
    pub(super) fn root(&self) -> u16 {
        self.slots[1].rec.offset as u16
    }

    #[inline]
    fn set_root(&mut self, idx: u16) {
        self.slots[1].rec.offset = idx as i32;
    }

    #[inline]
    fn first_free(&self) -> u16 {
        self.slots[1].right
    }

    #[inline]
    fn set_first_free(&mut self, idx: u16) {
        self.slots[1].right = idx;
    }

    #[inline]
    fn set_count(&mut self, n: usize) {
        self.slots[1].parent = n as u16;
    }

    #[inline]
    fn parent(&self, i: u16) -> u16 {
        self.slots[i as usize].parent
    }

    #[inline]
    fn set_parent(&mut self, i: u16, p: u16) {
        self.slots[i as usize].parent = p;
    }

    #[inline]
    pub(super) fn left(&self, i: u16) -> u16 {
        self.slots[i as usize].left
    }

    #[inline]
    fn set_left(&mut self, i: u16, l: u16) {
        self.slots[i as usize].left = l;
    }

    #[inline]
    pub(super) fn right(&self, i: u16) -> u16 {
        self.slots[i as usize].right
    }

    #[inline]
    fn set_right(&mut self, i: u16, r: u16) {
        self.slots[i as usize].right = r;
    }

    #[inline]
    fn is_red(&self, i: u16) -> bool {
        self.slots[i as usize].red
    }

    #[inline]
    fn set_red(&mut self, i: u16, red: bool) {
        self.slots[i as usize].red = red;
    }

    // заменить у p ребёнка old на new (какая бы сторона ни совпала)
    #[inline]
    fn relink_child(&mut self, p: u16, old: u16, new: u16) {
        if self.left(p) == old {
            self.set_left(p, new);
        } else {
            self.set_right(p, new);
        }
    }

    // ---- навигация ----

    pub(super) fn subtree_min(&self, mut i: u16) -> u16 {
        loop {
            let l = self.left(i);
            if l == 0 {
                return i;
            }
            i = l;
        }
    }

    pub(super) fn subtree_max(&self, mut i: u16) -> u16 {
        loop {
            let r = self.right(i);
            if r == 0 {
                return i;
            }
            i = r;
        }
    }

    /// Следующий in-order узел: минимум правого поддерева либо подъём,
    /// пока идём из правого ребёнка.
    pub(super) fn successor_idx(&self, mut i: u16) -> u16 {
        let r = self.right(i);
        if r != 0 {
            return self.subtree_min(r);
        }
        let mut p = self.parent(i);
        while p != 0 {
            if self.right(p) != i {
                break;
            }
            i = p;
            p = self.parent(p);
        }
        p
    }

    /// BST-поиск индекса записи; 0 — отсутствует.
    pub(super) fn find_idx(&self, rec: &KeyRecord<K>) -> u16 {
        let mut idx = self.root();
        while idx != 0 {
            let cur = &self.slots[idx as usize].rec;
            if rec < cur {
                idx = self.left(idx);
            } else if cur < rec {
                idx = self.right(idx);
            } else {
                break;
            }
        }
        idx
    }

    // ---- вставка ----

    /// Вставить запись. Предусловие: страница не полна (дерево следит за
    /// этим через предварительный сплит).
    pub fn insert(&mut self, rec: KeyRecord<K>) {
        // слот: голова free-списка, иначе первый нетронутый
        let idx = {
            let ff = self.first_free();
            if ff != 0 {
                self.set_first_free(self.right(ff));
                ff
            } else {
                (self.count() + 2) as u16
            }
        };
        self.slots[idx as usize].rec = rec;
        self.set_left(idx, 0);
        self.set_right(idx, 0);

        if self.count() == 0 {
            self.set_red(idx, false);
            self.set_parent(idx, 0);
            self.set_root(idx);
        } else {
            let mut p = self.root();
            loop {
                let less = rec < self.slots[p as usize].rec;
                let child = if less { self.left(p) } else { self.right(p) };
                if child == 0 {
                    self.set_parent(idx, p);
                    if less {
                        self.set_left(p, idx);
                    } else {
                        self.set_right(p, idx);
                    }
                    break;
                }
                p = child;
            }
            self.set_red(idx, true);
            self.insert_fixup(idx);
            let root = self.root();
            self.set_red(root, false);
        }

        self.set_count(self.count() + 1);
        self.dirty = true;
        self.min_idx = 0;
        self.max_idx = 0;
    }

    fn insert_fixup(&mut self, mut x: u16) {
        while x != self.root() {
            let p = self.parent(x);
            if !self.is_red(p) {
                break;
            }
            let pp = self.parent(p);
            if self.left(pp) == p {
                let y = self.right(pp);
                if self.is_red(y) {
                    self.set_red(p, false);
                    self.set_red(y, false);
                    self.set_red(pp, true);
                    x = pp;
                } else if self.right(p) == x {
                    x = p;
                    self.left_rotate(x);
                } else {
                    self.set_red(p, false);
                    self.set_red(pp, true);
                    self.right_rotate(pp);
                }
            } else {
                let y = self.left(pp);
                if self.is_red(y) {
                    self.set_red(p, false);
                    self.set_red(y, false);
                    self.set_red(pp, true);
                    x = pp;
                } else if self.left(p) == x {
                    x = p;
                    self.right_rotate(x);
                } else {
                    self.set_red(p, false);
                    self.set_red(pp, true);
                    self.left_rotate(pp);
                }
            }
        }
    }

    // ---- удаление ----

    /// Удалить запись; false — её не было. Освобождённый слот уходит в
    /// голову free-списка.
    pub fn delete(&mut self, rec: &KeyRecord<K>) -> bool {
        if self.count() == 0 {
            return false;
        }
        let idx = self.find_idx(rec);
        if idx == 0 {
            return false;
        }
        self.delete_idx(idx);
        self.dirty = true;
        self.min_idx = 0;
        self.max_idx = 0;
        true
    }

    fn delete_idx(&mut self, z: u16) {
        // сплайс: сам узел либо его преемник (если оба ребёнка)
        let i = if self.right(z) == 0 || self.left(z) == 0 {
            z
        } else {
            self.successor_idx(z)
        };
        let j = {
            let l = self.left(i);
            if l != 0 {
                l
            } else {
                self.right(i)
            }
        };
        let parent = self.parent(i);
        self.set_parent(j, parent); // j может быть слотом 0 — null-объект
        if parent == 0 {
            self.set_root(j);
        } else {
            self.relink_child(parent, i, j);
        }
        if i != z {
            // переносится только запись; связи и цвет слота z остаются
            self.slots[z as usize].rec = self.slots[i as usize].rec;
        }
        let was_black = !self.is_red(i);
        if was_black {
            self.delete_fixup(j);
        }
        self.free_slot(i);
        let c = self.count() - 1;
        self.set_count(c);
        if c == 0 {
            self.set_root(0);
        }
    }

    fn delete_fixup(&mut self, mut x: u16) {
        while x != self.root() {
            if self.is_red(x) {
                break;
            }
            let p = self.parent(x);
            if self.left(p) == x {
                let mut w = self.right(p);
                if self.is_red(w) {
                    self.set_red(w, false);
                    self.set_red(p, true);
                    self.left_rotate(p);
                    w = self.right(p);
                }
                let l = self.left(w);
                let r = self.right(w);
                if !self.is_red(l) && !self.is_red(r) {
                    self.set_red(w, true);
                    x = p;
                } else if !self.is_red(r) {
                    self.set_red(l, false);
                    self.set_red(w, true);
                    self.right_rotate(w);
                } else {
                    self.set_red(w, self.is_red(p));
                    self.set_red(p, false);
                    self.set_red(r, false);
                    self.left_rotate(p);
                    x = self.root();
                    break;
                }
            } else {
                let mut w = self.left(p);
                if self.is_red(w) {
                    self.set_red(w, false);
                    self.set_red(p, true);
                    self.right_rotate(p);
                    w = self.left(p);
                }
                let l = self.left(w);
                let r = self.right(w);
                if !self.is_red(l) && !self.is_red(r) {
                    self.set_red(w, true);
                    x = p;
                } else if !self.is_red(l) {
                    self.set_red(r, false);
                    self.set_red(w, true);
                    self.left_rotate(w);
                } else {
                    self.set_red(w, self.is_red(p));
                    self.set_red(p, false);
                    self.set_red(l, false);
                    self.right_rotate(p);
                    x = self.root();
                    break;
                }
            }
        }
        self.set_red(x, false);
    }

    fn free_slot(&mut self, i: u16) {
        let head = self.first_free();
        self.set_first_free(i);
        self.set_right(i, head);
    }

    // ---- вращения ----

    fn left_rotate(&mut self, x: u16) {
        let y = self.right(x);
        let yl = self.left(y);
        self.set_right(x, yl);
        if yl != 0 {
            self.set_parent(yl, x);
        }
        let p = self.parent(x);
        self.set_parent(y, p);
        if p == 0 {
            self.set_root(y);
        } else {
            self.relink_child(p, x, y);
        }
        self.set_left(y, x);
        self.set_parent(x, y);
    }

    fn right_rotate(&mut self, x: u16) {
        let y = self.left(x);
        let yr = self.right(y);
        self.set_left(x, yr);
        if yr != 0 {
            self.set_parent(yr, x);
        }
        let p = self.parent(x);
        self.set_parent(y, p);
        if p == 0 {
            self.set_root(y);
        } else {
            self.relink_child(p, x, y);
        }
        self.set_right(y, x);
        self.set_parent(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_KEYS_IN_PAGE;

    // Структурная проверка красно-чёрных инвариантов + возрастание in-order.
    fn validate<K: FixedKey>(page: &Page<K>) {
        let root = page.root();
        if root == 0 {
            assert_eq!(page.count(), 0);
            return;
        }
        assert!(!page.is_red(root), "root must be black");

        fn black_height<K: FixedKey>(page: &Page<K>, idx: u16) -> usize {
            if idx == 0 {
                return 1;
            }
            if page.is_red(idx) {
                assert!(
                    !page.is_red(page.left(idx)) && !page.is_red(page.right(idx)),
                    "red node with red child"
                );
            }
            let lh = black_height(page, page.left(idx));
            let rh = black_height(page, page.right(idx));
            assert_eq!(lh, rh, "unequal black height");
            lh + if page.is_red(idx) { 0 } else { 1 }
        }
        black_height(page, root);

        let mut keys = Vec::new();
        page.all_keys(&mut keys).unwrap();
        assert_eq!(keys.len(), page.count());
        for w in keys.windows(2) {
            assert!(w[0] < w[1], "in-order must be strictly increasing");
        }
    }

    #[test]
    fn random_inserts_keep_invariants() {
        let mut rng = oorandom::Rand32::new(0x5eed);
        let mut page = Page::<i64>::new(0);
        page.clear();
        let mut model = std::collections::BTreeSet::new();
        while model.len() < 800 {
            let k = rng.rand_i32() as i64;
            if model.insert(k) {
                page.insert(KeyRecord::new(k, 1));
            }
        }
        validate(&page);
        assert_eq!(page.count(), 800);
    }

    #[test]
    fn random_deletes_keep_invariants() {
        let mut rng = oorandom::Rand32::new(0xdead_beef);
        let mut page = Page::<i32>::new(0);
        page.clear();
        let mut model: Vec<i32> = (0..600).collect();
        for &k in &model {
            page.insert(KeyRecord::new(k, k));
        }
        // выкинуть половину в случайном порядке
        while model.len() > 300 {
            let at = (rng.rand_u32() as usize) % model.len();
            let k = model.swap_remove(at);
            assert!(page.delete(&KeyRecord::new(k, k)));
            validate(&page);
        }
        assert_eq!(page.count(), 300);
        // отсутствующий ключ
        assert!(!page.delete(&KeyRecord::new(-1, 0)));
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut page = Page::<i32>::new(0);
        page.clear();
        for i in 0..MAX_KEYS_IN_PAGE as i32 {
            page.insert(KeyRecord::new(i, 0));
        }
        assert!(page.is_full());
        // после удаления всегда можно вставить столько же обратно
        for i in 0..200 {
            assert!(page.delete(&KeyRecord::new(i, 0)));
        }
        for i in 0..200 {
            page.insert(KeyRecord::new(i, 0));
        }
        assert!(page.is_full());
        validate(&page);
    }

    #[test]
    fn duplicate_keys_with_distinct_offsets() {
        let mut page = Page::<i32>::new(0);
        page.clear();
        page.insert(KeyRecord::new(7, 1));
        page.insert(KeyRecord::new(7, 2));
        page.insert(KeyRecord::new(7, 0));
        validate(&page);
        let mut keys = Vec::new();
        page.all_keys(&mut keys).unwrap();
        assert_eq!(
            keys,
            vec![
                KeyRecord::new(7, 0),
                KeyRecord::new(7, 1),
                KeyRecord::new(7, 2)
            ]
        );
        assert!(page.delete(&KeyRecord::new(7, 1)));
        assert!(!page.delete(&KeyRecord::new(7, 1)));
        assert_eq!(page.count(), 2);
    }

    #[test]
    fn insert_then_delete_restores_contents() {
        let mut page = Page::<i32>::new(0);
        page.clear();
        for i in (0..100).step_by(2) {
            page.insert(KeyRecord::new(i, i));
        }
        let mut before = Vec::new();
        page.all_keys(&mut before).unwrap();

        page.insert(KeyRecord::new(51, 7));
        assert!(page.delete(&KeyRecord::new(51, 7)));

        let mut after = Vec::new();
        page.all_keys(&mut after).unwrap();
        assert_eq!(before, after);
        validate(&page);
    }

    #[test]
    fn successor_walks_in_order() {
        let mut page = Page::<i32>::new(0);
        page.clear();
        for i in [5, 1, 9, 3, 7] {
            page.insert(KeyRecord::new(i, 0));
        }
        assert_eq!(
            page.successor_of(&KeyRecord::new(3, 0)),
            Some(KeyRecord::new(5, 0))
        );
        assert_eq!(page.successor_of(&KeyRecord::new(9, 0)), None);
        assert_eq!(page.successor_of(&KeyRecord::new(4, 0)), None);
    }
}
