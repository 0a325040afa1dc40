//! Conversions between the domain, local and network task shapes

use super::model::{LocalTask, NetworkTask, NetworkTaskStatus, Task};

impl From<Task> for LocalTask {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            is_completed: task.is_completed,
        }
    }
}

impl From<LocalTask> for Task {
    fn from(local: LocalTask) -> Self {
        Self {
            id: local.id,
            title: local.title,
            description: local.description,
            is_completed: local.is_completed,
        }
    }
}

impl From<NetworkTask> for LocalTask {
    fn from(network: NetworkTask) -> Self {
        Self {
            is_completed: network.is_complete(),
            id: network.id,
            title: network.title,
            description: network.short_description,
        }
    }
}

impl From<LocalTask> for NetworkTask {
    fn from(local: LocalTask) -> Self {
        Self {
            id: local.id,
            title: local.title,
            short_description: local.description,
            status: status_for(local.is_completed),
        }
    }
}

impl From<Task> for NetworkTask {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            short_description: task.description,
            status: status_for(task.is_completed),
        }
    }
}

impl From<NetworkTask> for Task {
    fn from(network: NetworkTask) -> Self {
        Self {
            is_completed: network.is_complete(),
            id: network.id,
            title: network.title,
            description: network.short_description,
        }
    }
}

fn status_for(is_completed: bool) -> NetworkTaskStatus {
    if is_completed {
        NetworkTaskStatus::Complete
    } else {
        NetworkTaskStatus::Active
    }
}

impl Task {
    pub fn to_local(&self) -> LocalTask {
        self.clone().into()
    }

    pub fn to_network(&self) -> NetworkTask {
        self.clone().into()
    }
}

impl LocalTask {
    pub fn to_domain(&self) -> Task {
        self.clone().into()
    }

    pub fn to_network(&self) -> NetworkTask {
        self.clone().into()
    }
}

impl NetworkTask {
    pub fn to_local(&self) -> LocalTask {
        self.clone().into()
    }

    pub fn to_domain(&self) -> Task {
        self.clone().into()
    }
}

pub fn to_domain_list(tasks: &[LocalTask]) -> Vec<Task> {
    tasks.iter().map(LocalTask::to_domain).collect()
}

pub fn to_local_list(tasks: &[NetworkTask]) -> Vec<LocalTask> {
    tasks.iter().map(NetworkTask::to_local).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new("Title1").with_id("1").with_description("Description1"),
            Task::new("Title2")
                .with_id("2")
                .with_description("Description2")
                .with_completed(true),
            Task::new("").with_id("3"),
        ]
    }

    #[test]
    fn test_local_round_trip_is_stable() {
        for task in sample_tasks() {
            let local = task.to_local();
            assert_eq!(local.to_domain().to_local(), local);
            assert_eq!(local.to_domain(), task);
        }
    }

    #[test]
    fn test_network_round_trip_preserves_fields() {
        for task in sample_tasks() {
            assert_eq!(task.to_network().to_domain(), task);
            assert_eq!(task.to_local().to_network().to_local(), task.to_local());
        }
    }

    #[test]
    fn test_network_fields_map_to_local() {
        let mut network = NetworkTask::new("PISA", "Build tower", "No foundation work");
        network.status = NetworkTaskStatus::Complete;

        let local = network.to_local();
        assert_eq!(local.id, "PISA");
        assert_eq!(local.description, "No foundation work");
        assert!(local.is_completed);

        let back = local.to_network();
        assert_eq!(back.short_description, "No foundation work");
        assert_eq!(back.status, NetworkTaskStatus::Complete);
    }

    #[test]
    fn test_list_helpers_keep_order() {
        let locals: Vec<LocalTask> = sample_tasks().iter().map(Task::to_local).collect();
        let network: Vec<NetworkTask> = locals.iter().map(LocalTask::to_network).collect();
        assert_eq!(to_local_list(&network), locals);

        let ids: Vec<String> = to_domain_list(&locals).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
