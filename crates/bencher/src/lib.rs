#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    table: RouteTable,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, table: RouteTable) -> Self {
        Self { name, group, table }
    }

    pub fn small(name: &'static str, table: RouteTable) -> Self {
        Self::new(name, TestGroup::Small, table)
    }

    pub fn large(name: &'static str, table: RouteTable) -> Self {
        Self::new(name, TestGroup::Large, table)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn file_name(&self) -> &'static str {
        self.table().file_name
    }
}

/// A route fixture: `route VERB path` lines to register and `request VERB path` lines to resolve
#[derive(Debug, Copy, Clone)]
pub struct RouteTable {
    file_name: &'static str,
    content: &'static str,
}

impl RouteTable {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    pub fn routes(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.entries("route")
    }

    pub fn requests(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.entries("request")
    }

    fn entries(&self, kind: &'static str) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.content.lines().filter_map(move |line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(k), Some(verb), Some(path)) if k == kind => Some((verb, path)),
                _ => None,
            }
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}
