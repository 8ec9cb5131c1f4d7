//! In-memory gateway for tests.
//!
//! Mirrors the server's behaviour closely enough for the reconciler: new
//! tasks go to the top of their list, reorder keeps only ids that belong to
//! the list and appends the rest. Every call is recorded, and named
//! operations can be told to fail.

use std::cell::RefCell;
use std::collections::HashSet;

use async_trait::async_trait;

use super::{ApiError, ApiResult, BoardGateway};
use crate::models::{BoardList, ListId, ListPatch, Task, TaskId, TaskPatch};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListAllTasks,
    ListTasks(ListId),
    CreateTask(ListId, String),
    UpdateTask(TaskId, TaskPatch),
    DeleteTask(TaskId),
    SetOrder(ListId, Vec<TaskId>),
    ListLists,
    CreateList(String, String),
    UpdateList(ListId, ListPatch),
    DeleteList(ListId),
    ListNotepad,
    CreateNotepadEntry(String),
}

impl Call {
    fn op(&self) -> &'static str {
        match self {
            Call::ListAllTasks => "list_all_tasks",
            Call::ListTasks(_) => "list_tasks",
            Call::CreateTask(..) => "create_task",
            Call::UpdateTask(..) => "update_task",
            Call::DeleteTask(_) => "delete_task",
            Call::SetOrder(..) => "set_task_order",
            Call::ListLists => "list_lists",
            Call::CreateList(..) => "create_list",
            Call::UpdateList(..) => "update_list",
            Call::DeleteList(_) => "delete_list",
            Call::ListNotepad => "list_notepad",
            Call::CreateNotepadEntry(_) => "create_notepad_entry",
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    lists: Vec<BoardList>,
    tasks: Vec<Task>,
    notepad: Vec<Task>,
    next_id: u32,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
}

#[derive(Debug, Default)]
pub struct MockGateway {
    state: RefCell<MockState>,
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "simulated failure".into(),
    }
}

impl MockGateway {
    pub fn new(lists: Vec<BoardList>, tasks: Vec<Task>, notepad: Vec<Task>) -> Self {
        let next_id = tasks.iter().chain(notepad.iter()).map(|t| t.id).max().unwrap_or(0) + 100;
        let mut tasks = tasks;
        renumber(&mut tasks);
        Self {
            state: RefCell::new(MockState {
                lists,
                tasks,
                notepad,
                next_id,
                ..Default::default()
            }),
        }
    }

    /// Makes every later call of `op` (e.g. `"update_task"`) fail
    pub fn fail(&self, op: &'static str) {
        self.state.borrow_mut().failing.insert(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Server-side order of a list
    pub fn order(&self, list_id: ListId) -> Vec<TaskId> {
        sorted_in(&self.state.borrow().tasks, list_id).iter().map(|t| t.id).collect()
    }

    pub fn list_positions(&self) -> Vec<(ListId, i32)> {
        self.state.borrow().lists.iter().map(|l| (l.id, l.position)).collect()
    }

    pub fn notepad_ids(&self) -> Vec<TaskId> {
        self.state.borrow().notepad.iter().map(|t| t.id).collect()
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        let mut state = self.state.borrow_mut();
        let failing = state.failing.contains(call.op());
        state.calls.push(call);
        if failing {
            Err(server_error())
        } else {
            Ok(())
        }
    }

    fn next_task(&self, title: &str, list_id: Option<ListId>) -> Task {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        Task {
            id: state.next_id,
            title: title.to_string(),
            done: false,
            list_id,
            position: 0,
            created_at: None,
        }
    }
}

fn renumber(tasks: &mut [Task]) {
    let mut lists: Vec<ListId> = tasks.iter().filter_map(|t| t.list_id).collect();
    lists.sort_unstable();
    lists.dedup();
    for list_id in lists {
        let mut pos = 0;
        for task in tasks.iter_mut().filter(|t| t.list_id == Some(list_id)) {
            task.position = pos;
            pos += 1;
        }
    }
}

fn sorted_in(tasks: &[Task], list_id: ListId) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.iter().filter(|t| t.list_id == Some(list_id)).cloned().collect();
    out.sort_by_key(|t| t.position);
    out
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Not found".into(),
    }
}

#[async_trait(?Send)]
impl BoardGateway for MockGateway {
    async fn list_all_tasks(&self) -> ApiResult<Vec<Task>> {
        self.record(Call::ListAllTasks)?;
        let state = self.state.borrow();
        let mut all = state.tasks.clone();
        all.sort_by_key(|t| (t.list_id, t.position));
        Ok(all)
    }

    async fn list_tasks(&self, list_id: ListId) -> ApiResult<Vec<Task>> {
        self.record(Call::ListTasks(list_id))?;
        Ok(sorted_in(&self.state.borrow().tasks, list_id))
    }

    async fn create_task(&self, list_id: ListId, title: &str) -> ApiResult<Task> {
        self.record(Call::CreateTask(list_id, title.to_string()))?;
        let task = self.next_task(title, Some(list_id));
        let mut state = self.state.borrow_mut();
        for t in state.tasks.iter_mut().filter(|t| t.list_id == Some(list_id)) {
            t.position += 1;
        }
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> ApiResult<Task> {
        self.record(Call::UpdateTask(task_id, patch.clone()))?;
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let task = state
            .tasks
            .iter_mut()
            .chain(state.notepad.iter_mut())
            .find(|t| t.id == task_id)
            .ok_or_else(not_found)?;
        if let Some(title) = &patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(done) = patch.done {
            task.done = done;
        }
        if let Some(list_id) = patch.list_id {
            task.list_id = Some(list_id);
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: TaskId) -> ApiResult<()> {
        self.record(Call::DeleteTask(task_id))?;
        let mut state = self.state.borrow_mut();
        let before = state.tasks.len() + state.notepad.len();
        state.tasks.retain(|t| t.id != task_id);
        state.notepad.retain(|t| t.id != task_id);
        if state.tasks.len() + state.notepad.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn set_task_order(&self, list_id: ListId, order: &[TaskId]) -> ApiResult<()> {
        self.record(Call::SetOrder(list_id, order.to_vec()))?;
        let mut state = self.state.borrow_mut();
        let existing: Vec<TaskId> = sorted_in(&state.tasks, list_id).iter().map(|t| t.id).collect();
        let mut fin: Vec<TaskId> = order.iter().copied().filter(|id| existing.contains(id)).collect();
        fin.extend(existing.iter().copied().filter(|id| !order.contains(id)));
        for (pos, id) in fin.iter().enumerate() {
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == *id) {
                task.position = pos as i32;
            }
        }
        Ok(())
    }

    async fn list_lists(&self) -> ApiResult<Vec<BoardList>> {
        self.record(Call::ListLists)?;
        let mut lists = self.state.borrow().lists.clone();
        lists.sort_by_key(|l| (l.position, l.id));
        Ok(lists)
    }

    async fn create_list(&self, name: &str, color: &str) -> ApiResult<BoardList> {
        self.record(Call::CreateList(name.to_string(), color.to_string()))?;
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let list = BoardList {
            id: state.next_id,
            name: name.to_string(),
            color: Some(color.to_string()),
            position: 0,
            created_at: None,
        };
        state.lists.push(list.clone());
        Ok(list)
    }

    async fn update_list(&self, list_id: ListId, patch: &ListPatch) -> ApiResult<BoardList> {
        self.record(Call::UpdateList(list_id, patch.clone()))?;
        let mut state = self.state.borrow_mut();
        let list = state.lists.iter_mut().find(|l| l.id == list_id).ok_or_else(not_found)?;
        if let Some(name) = &patch.name {
            list.name = name.clone();
        }
        if let Some(position) = patch.position {
            list.position = position;
        }
        if let Some(color) = &patch.color {
            list.color = Some(color.clone());
        }
        Ok(list.clone())
    }

    async fn delete_list(&self, list_id: ListId) -> ApiResult<()> {
        self.record(Call::DeleteList(list_id))?;
        let mut state = self.state.borrow_mut();
        state.tasks.retain(|t| t.list_id != Some(list_id));
        let before = state.lists.len();
        state.lists.retain(|l| l.id != list_id);
        if state.lists.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn list_notepad(&self) -> ApiResult<Vec<Task>> {
        self.record(Call::ListNotepad)?;
        Ok(self.state.borrow().notepad.clone())
    }

    async fn create_notepad_entry(&self, title: &str) -> ApiResult<Task> {
        self.record(Call::CreateNotepadEntry(title.to_string()))?;
        let task = self.next_task(title, None);
        self.state.borrow_mut().notepad.insert(0, task.clone());
        Ok(task)
    }
}
