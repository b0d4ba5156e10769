//! Built-in sample of textbook passages served when the vector backend is
//! unreachable.

/// Date stamped on every cached entry; the cache is never re-ingested.
pub const CORPUS_SEEDED_AT: &str = "2025-12-16";

#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub content: &'static str,
    pub url: &'static str,
    pub position: u32,
    pub keywords: &'static [&'static str],
}

/// Immutable, insertion-ordered set of sample entries.
#[derive(Debug, Clone)]
pub struct LocalCorpus {
    entries: Vec<CorpusEntry>,
}

impl LocalCorpus {
    /// The six textbook samples.
    pub fn builtin() -> Self {
        Self { entries: SAMPLE_ENTRIES.to_vec() }
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.entries.iter().any(|e| e.url == url)
    }
}

impl Default for LocalCorpus {
    fn default() -> Self {
        Self::builtin()
    }
}

const SAMPLE_ENTRIES: [CorpusEntry; 6] = [
    CorpusEntry {
        content: "ROS 2 (Robot Operating System 2) is a flexible middleware for writing robot software. It's built on a publish-subscribe model where nodes communicate through topics and services. ROS 2 provides tools for hardware abstraction, message-passing between processes, package management, and more.",
        url: "/docs/02-ros-foundations/ros2-basics",
        position: 0,
        // Leading space: match "ros" at a word start, not inside "cross" or "erosion".
        keywords: &["ROS 2", "ROS2", " ROS", "Robot Operating System", "middleware", "publish-subscribe"],
    },
    CorpusEntry {
        content: "Humanoid robotics involves designing robots that mimic human form and movement. Key principles include bipedal locomotion, dexterous manipulation, perception systems, and balance control. Modern humanoids use advanced sensors, actuators, and AI for autonomous operation.",
        url: "/docs/07-humanoid-design/principles",
        position: 1,
        keywords: &["humanoid", "bipedal", "locomotion", "manipulation", "balance"],
    },
    CorpusEntry {
        content: "Physical AI combines robotics, computer vision, and machine learning to enable robots to understand and interact with the physical world. It involves perception, planning, control, and learning systems working together in real-world environments.",
        url: "/docs/01-fundamentals/physical-ai-overview",
        position: 0,
        keywords: &["Physical AI", "robotics", "vision", "machine learning", "control"],
    },
    CorpusEntry {
        content: "Vision-Language-Action (VLA) models are multimodal AI systems that can understand images and language to generate robot actions. They learn from demonstrations and can perform complex manipulation tasks through end-to-end learning.",
        url: "/docs/05-vision-language-action/overview",
        position: 0,
        keywords: &["VLA", "vision", "language", "action", "multimodal"],
    },
    CorpusEntry {
        content: "Simulation in robotics allows testing and development without hardware. Tools like Gazebo and IsaacGym provide physics simulation, sensor simulation, and visualization. Simulation helps with algorithm development, testing, and training machine learning models.",
        url: "/docs/03-simulation/overview",
        position: 0,
        keywords: &["simulation", "Gazebo", "IsaacGym", "physics", "testing"],
    },
    CorpusEntry {
        content: "Robot control systems use feedback loops to regulate motion and interaction with the environment. PID control, trajectory planning, force control, and impedance control are common techniques. Control systems must handle real-time constraints and disturbances.",
        url: "/docs/06-advanced-control/basics",
        position: 0,
        keywords: &["control", "PID", "trajectory", "feedback", "disturbance"],
    },
];
