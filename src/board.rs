//! Board State Store
//!
//! Client-side view of the board: ordered columns, each column's ordered
//! tasks, and the notepad. Every task lives in exactly one container; a
//! reverse index (task id -> container) is maintained alongside the
//! sequences so container lookups do not scan the whole board.
//!
//! Mutations are synchronous and report whether anything changed, so the
//! owner of the state decides when to notify subscribers.

use std::collections::{BTreeMap, HashMap};

use crate::models::{BoardList, Container, ListId, Task, TaskId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    lists: Vec<BoardList>,
    tasks_by_list: BTreeMap<ListId, Vec<Task>>,
    notepad: Vec<Task>,
    owner: HashMap<TaskId, Container>,
}

/// Describes how to undo a tentative move of a single item.
///
/// Every drag mutation moves exactly one item, so putting that item back
/// restores the previous order of every container it touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversal {
    /// Put the column back at `index`
    Column { list_id: ListId, index: usize },
    /// Put the task back into `container` at `index`
    Task { task_id: TaskId, container: Container, index: usize },
}

/// Sorts columns left-to-right: ascending position, ties by id.
pub fn sort_lists(lists: &mut [BoardList]) {
    lists.sort_by_key(|l| (l.position, l.id));
}

/// Remove-then-insert; callers have validated both indices.
fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

impl BoardState {
    /// Builds a board from a full load.
    ///
    /// Tasks whose `list_id` does not name one of `lists` are left out (the
    /// server keeps notepad entries in a hidden list of its own).
    pub fn from_parts(lists: Vec<BoardList>, tasks: Vec<Task>, notepad: Vec<Task>) -> Self {
        let mut board = BoardState::default();
        board.apply_lists_snapshot(lists);

        let mut grouped: BTreeMap<ListId, Vec<Task>> = BTreeMap::new();
        for task in tasks {
            if let Some(list_id) = task.list_id {
                if board.tasks_by_list.contains_key(&list_id) {
                    grouped.entry(list_id).or_default().push(task);
                }
            }
        }
        for (list_id, mut tasks) in grouped {
            tasks.sort_by_key(|t| t.position);
            board.apply_list_snapshot(list_id, tasks);
        }
        board.apply_notepad_snapshot(notepad);
        board
    }

    // ========================
    // Queries
    // ========================

    pub fn lists(&self) -> &[BoardList] {
        &self.lists
    }

    pub fn list(&self, list_id: ListId) -> Option<&BoardList> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn notepad(&self) -> &[Task] {
        &self.notepad
    }

    /// Tasks of a list; empty for unknown lists
    pub fn list_tasks(&self, list_id: ListId) -> &[Task] {
        self.tasks_by_list.get(&list_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tasks(&self, container: Container) -> &[Task] {
        match container {
            Container::List(id) => self.list_tasks(id),
            Container::Notepad => &self.notepad,
        }
    }

    pub fn has_container(&self, container: Container) -> bool {
        match container {
            Container::List(id) => self.tasks_by_list.contains_key(&id),
            Container::Notepad => true,
        }
    }

    pub fn column_index(&self, list_id: ListId) -> Option<usize> {
        self.lists.iter().position(|l| l.id == list_id)
    }

    /// Which container currently owns `task_id`
    pub fn container_of(&self, task_id: TaskId) -> Option<Container> {
        self.owner.get(&task_id).copied()
    }

    pub fn index_in(&self, container: Container, task_id: TaskId) -> Option<usize> {
        self.tasks(container).iter().position(|t| t.id == task_id)
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        let container = self.container_of(task_id)?;
        self.tasks(container).iter().find(|t| t.id == task_id)
    }

    /// Task ids of a container in display order
    pub fn order(&self, container: Container) -> Vec<TaskId> {
        self.tasks(container).iter().map(|t| t.id).collect()
    }

    pub fn list_order(&self) -> Vec<ListId> {
        self.lists.iter().map(|l| l.id).collect()
    }

    /// Every task id on the board, container by container
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks_by_list
            .values()
            .flatten()
            .chain(self.notepad.iter())
            .map(|t| t.id)
            .collect()
    }

    fn tasks_mut(&mut self, container: Container) -> Option<&mut Vec<Task>> {
        match container {
            Container::List(id) => self.tasks_by_list.get_mut(&id),
            Container::Notepad => Some(&mut self.notepad),
        }
    }

    // ========================
    // Drag mutations
    // ========================

    /// Moves the column at `from` to `to`. No-op for equal or out-of-range indices.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        let len = self.lists.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        array_move(&mut self.lists, from, to);
        true
    }

    /// Reorders one list's tasks with array-move semantics.
    pub fn move_within_list(&mut self, list_id: ListId, from: usize, to: usize) -> bool {
        self.move_within(Container::List(list_id), from, to)
    }

    pub(crate) fn move_within(&mut self, container: Container, from: usize, to: usize) -> bool {
        let Some(tasks) = self.tasks_mut(container) else {
            return false;
        };
        let len = tasks.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        array_move(tasks, from, to);
        true
    }

    /// Moves a task between containers, inserting at `insert_at` clamped to
    /// the destination length. Nothing changes if the task is not in `from`,
    /// the containers are equal, or the destination does not exist.
    pub fn move_across_containers(
        &mut self,
        task_id: TaskId,
        from: Container,
        to: Container,
        insert_at: usize,
    ) -> bool {
        if from == to || !self.has_container(to) {
            return false;
        }
        let Some(index) = self.index_in(from, task_id) else {
            return false;
        };
        let Some(source) = self.tasks_mut(from) else {
            return false;
        };
        let mut task = source.remove(index);
        task.list_id = to.list_id();

        if let Some(dest) = self.tasks_mut(to) {
            let at = insert_at.min(dest.len());
            dest.insert(at, task);
        }
        self.owner.insert(task_id, to);
        true
    }

    /// Applies a [`Reversal`], wherever the item has moved since.
    pub fn revert(&mut self, reversal: Reversal) -> bool {
        match reversal {
            Reversal::Column { list_id, index } => {
                let Some(current) = self.column_index(list_id) else {
                    return false;
                };
                let index = index.min(self.lists.len().saturating_sub(1));
                self.move_column(current, index)
            }
            Reversal::Task { task_id, container, index } => {
                let Some(current) = self.container_of(task_id) else {
                    return false;
                };
                if current == container {
                    let Some(from) = self.index_in(container, task_id) else {
                        return false;
                    };
                    let last = self.tasks(container).len().saturating_sub(1);
                    self.move_within(container, from, index.min(last))
                } else {
                    self.move_across_containers(task_id, current, container, index)
                }
            }
        }
    }

    // ========================
    // Snapshots from the server
    // ========================

    /// Replaces the columns wholesale. Task arrays follow the new set of ids:
    /// new lists start empty, vanished lists drop their tasks.
    pub fn apply_lists_snapshot(&mut self, mut lists: Vec<BoardList>) {
        sort_lists(&mut lists);

        let keep: Vec<ListId> = lists.iter().map(|l| l.id).collect();
        let removed: Vec<ListId> = self
            .tasks_by_list
            .keys()
            .copied()
            .filter(|id| !keep.contains(id))
            .collect();
        for list_id in removed {
            self.drop_list_tasks(list_id);
        }
        for id in keep {
            self.tasks_by_list.entry(id).or_default();
        }
        self.lists = lists;
    }

    /// Replaces one list's tasks. Incoming tasks found in another container
    /// are taken out of it first. Unknown lists are ignored.
    pub fn apply_list_snapshot(&mut self, list_id: ListId, tasks: Vec<Task>) -> bool {
        if !self.tasks_by_list.contains_key(&list_id) {
            return false;
        }
        self.replace_container(Container::List(list_id), tasks);
        true
    }

    pub fn apply_notepad_snapshot(&mut self, tasks: Vec<Task>) {
        self.replace_container(Container::Notepad, tasks);
    }

    fn replace_container(&mut self, container: Container, mut tasks: Vec<Task>) {
        if !self.has_container(container) {
            return;
        }
        // Single ownership: duplicates inside the snapshot keep their first copy
        let mut seen = Vec::with_capacity(tasks.len());
        tasks.retain(|t| {
            if seen.contains(&t.id) {
                false
            } else {
                seen.push(t.id);
                true
            }
        });

        for task in &tasks {
            if let Some(other) = self.container_of(task.id) {
                if other != container {
                    if let Some(seq) = self.tasks_mut(other) {
                        seq.retain(|t| t.id != task.id);
                    }
                }
            }
        }

        let previous = self.tasks_mut(container).map(std::mem::take).unwrap_or_default();
        for task in previous {
            self.owner.remove(&task.id);
        }
        for task in tasks.iter_mut() {
            task.list_id = container.list_id();
            self.owner.insert(task.id, container);
        }
        if let Some(seq) = self.tasks_mut(container) {
            *seq = tasks;
        }
    }

    fn drop_list_tasks(&mut self, list_id: ListId) {
        if let Some(tasks) = self.tasks_by_list.remove(&list_id) {
            for task in tasks {
                self.owner.remove(&task.id);
            }
        }
    }

    // ========================
    // Entity edits
    // ========================

    /// Inserts a new task; fails if the id is already on the board.
    pub fn insert_task(&mut self, container: Container, index: usize, mut task: Task) -> bool {
        if self.owner.contains_key(&task.id) {
            return false;
        }
        task.list_id = container.list_id();
        let id = task.id;
        let Some(seq) = self.tasks_mut(container) else {
            return false;
        };
        let at = index.min(seq.len());
        seq.insert(at, task);
        self.owner.insert(id, container);
        true
    }

    /// Removes a task, returning where it was.
    pub fn remove_task(&mut self, task_id: TaskId) -> Option<(Container, usize, Task)> {
        let container = self.container_of(task_id)?;
        let index = self.index_in(container, task_id)?;
        let task = self.tasks_mut(container)?.remove(index);
        self.owner.remove(&task_id);
        Some((container, index, task))
    }

    /// Replaces a task's fields in place. Its container does not change.
    pub fn replace_task(&mut self, mut task: Task) -> bool {
        let Some(container) = self.container_of(task.id) else {
            return false;
        };
        task.list_id = container.list_id();
        let Some(slot) = self
            .tasks_mut(container)
            .and_then(|seq| seq.iter_mut().find(|t| t.id == task.id))
        else {
            return false;
        };
        *slot = task;
        true
    }

    /// Swaps a placeholder for the server's copy at the same index.
    pub fn replace_task_id(&mut self, old_id: TaskId, mut task: Task) -> bool {
        let Some(container) = self.container_of(old_id) else {
            return false;
        };
        if old_id != task.id && self.owner.contains_key(&task.id) {
            return false;
        }
        task.list_id = container.list_id();
        let new_id = task.id;
        let Some(slot) = self
            .tasks_mut(container)
            .and_then(|seq| seq.iter_mut().find(|t| t.id == old_id))
        else {
            return false;
        };
        *slot = task;
        self.owner.remove(&old_id);
        self.owner.insert(new_id, container);
        true
    }

    /// Appends or replaces a column, keeping position order.
    pub fn upsert_list(&mut self, list: BoardList) {
        match self.lists.iter_mut().find(|l| l.id == list.id) {
            Some(slot) => *slot = list,
            None => {
                self.tasks_by_list.entry(list.id).or_default();
                self.lists.push(list);
            }
        }
        sort_lists(&mut self.lists);
    }

    /// Removes a column and, with it, every task it owns.
    pub fn remove_list(&mut self, list_id: ListId) -> Option<BoardList> {
        let index = self.column_index(list_id)?;
        self.drop_list_tasks(list_id);
        Some(self.lists.remove(index))
    }

    /// Rewrites positions as `0..n` in current column order.
    pub fn renumber_positions(&mut self) {
        for (i, list) in self.lists.iter_mut().enumerate() {
            list.position = i as i32;
        }
    }
}
