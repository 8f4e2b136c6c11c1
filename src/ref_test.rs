// Reference index, a flat vector addressed by key.
struct RefNodes {
    entries: Vec<Option<i64>>,
}

impl RefNodes {
    fn new(capacity: usize) -> RefNodes {
        RefNodes {
            entries: vec![None; capacity],
        }
    }

    fn len(&self) -> usize {
        self.entries.iter().filter(|item| item.is_some()).count()
    }

    fn get(&self, key: i64) -> Option<i64> {
        self.entries[key as usize]
    }

    fn iter(&self) -> std::vec::IntoIter<(i64, i64)> {
        self.walk(0, (self.entries.len() - 1) as i64).into_iter()
    }

    // inclusive on both ends, descending when from > to.
    fn walk(&self, from: i64, to: i64) -> Vec<(i64, i64)> {
        let (low, high) = if from <= to { (from, to) } else { (to, from) };
        let high = std::cmp::min(high, (self.entries.len() - 1) as i64);
        let mut items: Vec<(i64, i64)> = (low..=high)
            .filter_map(|key| self.get(key).map(|value| (key, value)))
            .collect();
        if from > to {
            items.reverse();
        }
        items
    }

    fn set(&mut self, key: i64, value: i64) -> bool {
        self.entries[key as usize].replace(value).is_none()
    }

    fn set_nx(&mut self, key: i64, value: i64) -> bool {
        let entry = &mut self.entries[key as usize];
        if entry.is_some() {
            false
        } else {
            *entry = Some(value);
            true
        }
    }

    fn delete(&mut self, key: i64) -> bool {
        self.entries[key as usize].take().is_some()
    }

    fn move_key(&mut self, old_key: i64, new_key: i64) -> bool {
        match self.entries[old_key as usize].take() {
            None => false,
            Some(value) => {
                self.entries[new_key as usize] = Some(value);
                true
            }
        }
    }
}

fn random_from_to(size: usize) -> (i64, i64) {
    let size = size as u64;
    let from = (random::<u64>() % size) as i64;
    let to = (random::<u64>() % size) as i64;
    (from, to)
}
