//! Running rules over candidate nodes.
//!
//! A run is split into independent jobs: one per (rule, node) pair for
//! per-node rules, one per node for all requested per-mesh rules, and one per
//! rule for rules that need the whole candidate list. A node's mesh is opened
//! once and shared by every per-mesh rule. Each job yields partial
//! [`RuleResult`]s; partial results are merged by set union, so sequential and
//! parallel runs agree exactly.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{CheckError, CheckResult, ProviderError};
use crate::id::NodeId;
use crate::params::CheckParams;
use crate::provider::{MeshHandle, NodeResolver};
use crate::report::{CheckRunResult, Diagnostic, RuleResult, RuleStatus, Violation};
use crate::rules::{self, Category, Check, RuleSpec};

/// A validated set of rules and candidate nodes.
///
/// Rules are kept in name order and nodes in id order, each without
/// duplicates.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    rules: Vec<&'static RuleSpec>,
    nodes: Vec<NodeId>,
}

impl CheckRequest {
    /// Build a request from rule names and candidate nodes.
    ///
    /// # Errors
    ///
    /// - [`CheckError::NoRules`] if `rules` is empty
    /// - [`CheckError::UnknownRule`] for a name not in the registry
    /// - [`CheckError::NoNodes`] if `nodes` is empty
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_integrity::{CheckError, CheckRequest, NodeId};
    ///
    /// let node = NodeId::new_v4();
    /// let request = CheckRequest::new(["ngons", "triangles", "ngons"], [node]).unwrap();
    /// assert_eq!(request.rule_names(), vec!["ngons", "triangles"]);
    ///
    /// assert!(matches!(
    ///     CheckRequest::new(["bogus"], [node]),
    ///     Err(CheckError::UnknownRule(_))
    /// ));
    /// ```
    pub fn new<S: AsRef<str>>(
        rules: impl IntoIterator<Item = S>,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> CheckResult<Self> {
        let mut specs = Vec::new();
        for name in rules {
            let name = name.as_ref();
            let spec =
                rules::lookup(name).ok_or_else(|| CheckError::UnknownRule(name.to_owned()))?;
            specs.push(spec);
        }
        Self::from_specs(specs, nodes)
    }

    /// Request every registered rule.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::NoNodes`] if `nodes` is empty.
    pub fn all_rules(nodes: impl IntoIterator<Item = NodeId>) -> CheckResult<Self> {
        Self::from_specs(rules::all().iter().collect(), nodes)
    }

    /// Request every rule in one category.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::NoNodes`] if `nodes` is empty.
    pub fn category(
        category: Category,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> CheckResult<Self> {
        Self::from_specs(rules::in_category(category).collect(), nodes)
    }

    fn from_specs(
        mut specs: Vec<&'static RuleSpec>,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> CheckResult<Self> {
        if specs.is_empty() {
            return Err(CheckError::NoRules);
        }
        specs.sort_by_key(|spec| spec.name);
        specs.dedup_by_key(|spec| spec.name);

        let nodes: BTreeSet<NodeId> = nodes.into_iter().collect();
        let nodes: Vec<NodeId> = nodes.into_iter().collect();
        if nodes.is_empty() {
            return Err(CheckError::NoNodes);
        }

        Ok(Self {
            rules: specs,
            nodes,
        })
    }

    /// Requested rules.
    #[must_use]
    pub fn rules(&self) -> &[&'static RuleSpec] {
        &self.rules
    }

    /// Names of the requested rules.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|spec| spec.name).collect()
    }

    /// Candidate nodes.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    fn jobs(&self) -> Vec<Job> {
        let mut jobs = Vec::new();
        let mut element_rules = Vec::new();
        for &spec in &self.rules {
            match spec.check {
                Check::Group(_) => jobs.push(Job::Group(spec)),
                Check::Node(_) => {
                    jobs.extend(self.nodes.iter().map(|&node| Job::Node(spec, node)));
                }
                Check::Element(_) => element_rules.push(spec),
            }
        }
        if !element_rules.is_empty() {
            let element_rules: Arc<[&'static RuleSpec]> = element_rules.into();
            jobs.extend(
                self.nodes
                    .iter()
                    .map(|&node| Job::Mesh(Arc::clone(&element_rules), node)),
            );
        }
        jobs
    }
}

#[derive(Debug, Clone)]
enum Job {
    Group(&'static RuleSpec),
    Node(&'static RuleSpec, NodeId),
    Mesh(Arc<[&'static RuleSpec]>, NodeId),
}

/// Evaluates requests against a scene.
///
/// # Example
///
/// ```
/// use mesh_integrity::{CheckRequest, CheckRunner, InMemoryScene};
/// use mesh_types::PolyMesh;
///
/// let mut scene = InMemoryScene::new();
/// let (quad, _) = scene.add_mesh_object("quad", None, PolyMesh::unit_quad());
///
/// let request = CheckRequest::new(["open_edges", "ngons"], [quad]).unwrap();
/// let result = CheckRunner::new(&scene).run(&request).unwrap();
///
/// assert_eq!(result.get("open_edges").unwrap().len(), 4);
/// assert!(result.get("ngons").unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct CheckRunner<'a, R: NodeResolver> {
    resolver: &'a R,
    params: CheckParams,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a, R: NodeResolver> CheckRunner<'a, R> {
    /// Create a runner with default parameters.
    #[must_use]
    pub fn new(resolver: &'a R) -> Self {
        Self {
            resolver,
            params: CheckParams::default(),
            cancel: None,
        }
    }

    /// Use custom thresholds.
    #[must_use]
    pub fn with_params(mut self, params: CheckParams) -> Self {
        self.params = params;
        self
    }

    /// Poll `flag` before each (rule, node) evaluation and abort once it is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Thresholds in use.
    #[must_use]
    pub fn params(&self) -> &CheckParams {
        &self.params
    }

    /// Run a request on the calling thread.
    ///
    /// Provider failures never abort the run; they are recorded as
    /// diagnostics on the affected rule.
    ///
    /// # Errors
    ///
    /// - [`CheckError::InvalidParams`] if the parameters fail validation,
    ///   before any provider is queried
    /// - [`CheckError::Cancelled`] if the cancel flag was set
    pub fn run(&self, request: &CheckRequest) -> CheckResult<CheckRunResult> {
        let jobs = self.prepare(request)?;
        let mut result = seed(request);
        for job in jobs {
            for partial in self.evaluate(job, &request.nodes)? {
                result.insert(partial);
            }
        }
        Ok(finish(result))
    }

    fn prepare(&self, request: &CheckRequest) -> CheckResult<Vec<Job>> {
        self.params.validate()?;
        let jobs = request.jobs();
        info!(
            rules = request.rules.len(),
            nodes = request.nodes.len(),
            jobs = jobs.len(),
            "Starting integrity check"
        );
        Ok(jobs)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn check_cancelled(&self) -> CheckResult<()> {
        if self.is_cancelled() {
            return Err(CheckError::Cancelled);
        }
        Ok(())
    }

    fn evaluate(&self, job: Job, nodes: &[NodeId]) -> CheckResult<Vec<RuleResult>> {
        match job {
            Job::Group(spec) => {
                self.check_cancelled()?;
                Ok(vec![self.evaluate_group(spec, nodes)])
            }
            Job::Node(spec, node) => {
                self.check_cancelled()?;
                Ok(vec![self.evaluate_node(spec, node)])
            }
            Job::Mesh(specs, node) => self.evaluate_mesh(&specs, node),
        }
    }

    fn evaluate_group(&self, spec: &'static RuleSpec, nodes: &[NodeId]) -> RuleResult {
        let mut result = RuleResult::new(spec.name, spec.kind);
        if let Check::Group(check) = spec.check {
            let scan = check(nodes, self.resolver, &self.params);
            for node in scan.flagged {
                result.insert(Violation::node(node));
            }
            for (node, err) in scan.failures {
                record_failure(&mut result, node, &err);
            }
        }
        result
    }

    fn evaluate_node(&self, spec: &'static RuleSpec, node: NodeId) -> RuleResult {
        let mut result = RuleResult::new(spec.name, spec.kind);
        if let Check::Node(check) = spec.check {
            match check(node, self.resolver, &self.params) {
                Ok(true) => result.insert(Violation::node(node)),
                Ok(false) => {}
                Err(err) => record_failure(&mut result, node, &err),
            }
        }
        result
    }

    /// Open the node's mesh once and run every per-mesh rule on it.
    fn evaluate_mesh(
        &self,
        specs: &[&'static RuleSpec],
        node: NodeId,
    ) -> CheckResult<Vec<RuleResult>> {
        self.check_cancelled()?;
        let handle = match MeshHandle::open(self.resolver, node) {
            Ok(Some(handle)) => handle,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => {
                return Ok(specs
                    .iter()
                    .map(|spec| {
                        let mut result = RuleResult::new(spec.name, spec.kind);
                        record_failure(&mut result, node, &err);
                        result
                    })
                    .collect());
            }
        };

        let mut results = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if i > 0 {
                self.check_cancelled()?;
            }
            let Check::Element(check) = spec.check else {
                continue;
            };
            let mut result = RuleResult::new(spec.name, spec.kind);
            match check(&handle, &self.params) {
                Ok(scan) => {
                    for index in scan.flagged {
                        result.insert(Violation::element(node, spec.kind, index));
                    }
                    for (index, reason) in scan.skipped {
                        warn!(rule = spec.name, node = %node, element = index, "{reason}");
                        result.push_diagnostic(
                            Diagnostic::warning(reason)
                                .with_node(node)
                                .with_element(index),
                        );
                    }
                }
                Err(err) => record_failure(&mut result, node, &err),
            }
            results.push(result);
        }
        Ok(results)
    }
}

impl<R: NodeResolver + Sync> CheckRunner<'_, R> {
    /// Run a request across the rayon thread pool.
    ///
    /// Produces exactly the result [`run`](Self::run) would.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_parallel(&self, request: &CheckRequest) -> CheckResult<CheckRunResult> {
        let jobs = self.prepare(request)?;
        let partials = jobs
            .into_par_iter()
            .map(|job| self.evaluate(job, &request.nodes))
            .collect::<CheckResult<Vec<_>>>()?;

        let mut result = seed(request);
        for partial in partials.into_iter().flatten() {
            result.insert(partial);
        }
        Ok(finish(result))
    }
}

/// One empty entry per requested rule.
fn seed(request: &CheckRequest) -> CheckRunResult {
    let mut result = CheckRunResult::new();
    for spec in &request.rules {
        result.insert(RuleResult::new(spec.name, spec.kind));
    }
    result
}

fn finish(result: CheckRunResult) -> CheckRunResult {
    for rule in result.iter() {
        match rule.status() {
            RuleStatus::Degraded => warn!(
                rule = rule.rule(),
                violations = rule.len(),
                diagnostics = rule.diagnostics().len(),
                "Rule could not check every node"
            ),
            status => debug!(
                rule = rule.rule(),
                violations = rule.len(),
                status = status.as_str(),
                "Rule finished"
            ),
        }
    }

    if result.is_clean() {
        info!(rules = result.len(), "Integrity check passed");
    } else {
        info!(
            rules = result.len(),
            violations = result.violation_count(),
            failed = result.failed_rules().len(),
            "Integrity check found issues"
        );
    }
    result
}

fn record_failure(result: &mut RuleResult, node: NodeId, err: &ProviderError) {
    warn!(rule = result.rule(), node = %node, error = %err, "Rule could not check node");
    result.push_diagnostic(Diagnostic::error(err.to_string()).with_node(node));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderResult;
    use crate::id::{ElementKind, NodeKind};
    use crate::provider::{MeshTopologyProvider, WorldTransform};
    use crate::scene::InMemoryScene;
    use mesh_types::{Point3, PolyMesh};
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn request_rejects_empty_inputs() {
        let node = NodeId::new_v4();
        assert!(matches!(
            CheckRequest::new(Vec::<&str>::new(), [node]),
            Err(CheckError::NoRules)
        ));
        assert!(matches!(
            CheckRequest::new(["ngons"], []),
            Err(CheckError::NoNodes)
        ));
        assert!(matches!(
            CheckRequest::new(["ngons", "flying_pigs"], [node]),
            Err(CheckError::UnknownRule(name)) if name == "flying_pigs"
        ));
    }

    #[test]
    fn request_collapses_duplicates() {
        let node = NodeId::new_v4();
        let request = CheckRequest::new(["poles", "layers", "poles"], [node, node]).unwrap();
        assert_eq!(request.rule_names(), vec!["layers", "poles"]);
        assert_eq!(request.nodes(), &[node]);
    }

    #[test]
    fn category_request() {
        let request = CheckRequest::category(Category::Uv, [NodeId::new_v4()]).unwrap();
        assert_eq!(request.rules().len(), 5);
        assert!(request.rules().iter().all(|r| r.category == Category::Uv));
        assert_eq!(
            CheckRequest::all_rules([NodeId::new_v4()]).unwrap().rules().len(),
            rules::all().len()
        );
    }

    #[test]
    fn group_rules_run_once() {
        let node = NodeId::new_v4();
        let other = NodeId::new_v4();
        let request = CheckRequest::new(["duplicated_names", "layers"], [node, other]).unwrap();
        // One job for the group rule, one per node for the node rule.
        assert_eq!(request.jobs().len(), 3);
    }

    #[test]
    fn element_rules_share_one_job_per_node() {
        let node = NodeId::new_v4();
        let other = NodeId::new_v4();
        let request =
            CheckRequest::new(["ngons", "open_edges", "poles", "layers"], [node, other]).unwrap();
        // Two node-rule jobs plus one mesh job per node.
        assert_eq!(request.jobs().len(), 4);
    }

    /// Delegates to a scene and counts how often meshes are opened.
    struct CountingResolver {
        scene: InMemoryScene,
        opened: AtomicUsize,
    }

    impl NodeResolver for CountingResolver {
        fn resolve_name(&self, node: NodeId) -> ProviderResult<String> {
            self.scene.resolve_name(node)
        }
        fn node_kind(&self, node: NodeId) -> ProviderResult<NodeKind> {
            self.scene.node_kind(node)
        }
        fn world_transform(&self, node: NodeId) -> ProviderResult<WorldTransform> {
            self.scene.world_transform(node)
        }
        fn rotate_pivot_world(&self, node: NodeId) -> ProviderResult<Point3<f64>> {
            self.scene.rotate_pivot_world(node)
        }
        fn parent(&self, node: NodeId) -> ProviderResult<Option<NodeId>> {
            self.scene.parent(node)
        }
        fn children(&self, node: NodeId) -> ProviderResult<Vec<NodeId>> {
            self.scene.children(node)
        }
        fn shape_of(&self, node: NodeId) -> ProviderResult<Option<NodeId>> {
            self.scene.shape_of(node)
        }
        fn shading_groups(&self, node: NodeId) -> ProviderResult<Vec<String>> {
            self.scene.shading_groups(node)
        }
        fn upstream_history_size(&self, node: NodeId) -> ProviderResult<usize> {
            self.scene.upstream_history_size(node)
        }
        fn display_layer(&self, node: NodeId) -> ProviderResult<Option<String>> {
            self.scene.display_layer(node)
        }
        fn open_mesh(&self, shape: NodeId) -> ProviderResult<Box<dyn MeshTopologyProvider + '_>> {
            self.opened.fetch_add(1, Ordering::Relaxed);
            self.scene.open_mesh(shape)
        }
    }

    #[test]
    fn mesh_is_opened_once_per_node() {
        let mut scene = InMemoryScene::new();
        let (cube, _) = scene.add_mesh_object("cube", None, PolyMesh::unit_cube());
        let (quad, _) = scene.add_mesh_object("quad", None, PolyMesh::unit_quad());
        let resolver = CountingResolver {
            scene,
            opened: AtomicUsize::new(0),
        };

        let request = CheckRequest::all_rules([cube, quad]).unwrap();
        let result = CheckRunner::new(&resolver).run(&request).unwrap();
        assert_eq!(resolver.opened.load(Ordering::Relaxed), 2);

        resolver.opened.store(0, Ordering::Relaxed);
        let parallel = CheckRunner::new(&resolver).run_parallel(&request).unwrap();
        assert_eq!(resolver.opened.load(Ordering::Relaxed), 2);
        assert_eq!(result, parallel);
    }

    #[test]
    fn unopenable_mesh_degrades_every_element_rule() {
        let scene = InMemoryScene::new();
        let ghost = NodeId::new_v4();

        let request = CheckRequest::new(["ngons", "open_edges"], [ghost]).unwrap();
        let result = CheckRunner::new(&scene).run(&request).unwrap();

        for rule in ["ngons", "open_edges"] {
            let entry = result.get(rule).unwrap();
            assert_eq!(entry.status(), RuleStatus::Degraded);
            assert_eq!(entry.diagnostics().len(), 1);
        }
    }

    #[test]
    fn every_requested_rule_has_an_entry() {
        let mut scene = InMemoryScene::new();
        let (cube, _) = scene.add_mesh_object("cube", None, PolyMesh::unit_cube());

        let request = CheckRequest::all_rules([cube]).unwrap();
        let result = CheckRunner::new(&scene).run(&request).unwrap();

        assert_eq!(result.len(), rules::all().len());
        for spec in rules::all() {
            let entry = result.get(spec.name).unwrap();
            assert_eq!(entry.kind(), spec.kind);
        }
        assert_eq!(result.get("missing_uvs").unwrap().len(), 6);
        assert!(result.get("open_edges").unwrap().is_empty());
    }

    #[test]
    fn provider_failure_degrades_only_that_rule() {
        let mut scene = InMemoryScene::new();
        let (live, _) = scene.add_mesh_object("live", None, PolyMesh::unit_quad());
        let ghost = NodeId::new_v4();

        let request = CheckRequest::new(["open_edges", "layers"], [live, ghost]).unwrap();
        let result = CheckRunner::new(&scene).run(&request).unwrap();

        let open = result.get("open_edges").unwrap();
        assert_eq!(open.status(), RuleStatus::Degraded);
        assert_eq!(open.len(), 4);
        assert_eq!(open.diagnostics().len(), 1);
        assert_eq!(open.diagnostics()[0].node, Some(ghost));

        let layers = result.get("layers").unwrap();
        assert_eq!(layers.status(), RuleStatus::Degraded);
        assert!(layers.is_empty());
    }

    #[test]
    fn nodes_without_mesh_are_skipped_by_element_rules() {
        let mut scene = InMemoryScene::new();
        let group = scene.add_transform("grp", None);

        let request = CheckRequest::new(["ngons"], [group]).unwrap();
        let result = CheckRunner::new(&scene).run(&request).unwrap();
        assert_eq!(result.get("ngons").unwrap().status(), RuleStatus::Passed);
    }

    #[test]
    fn violations_are_attributed_to_candidate_node() {
        let mut scene = InMemoryScene::new();
        let (quad, shape) = scene.add_mesh_object("quad", None, PolyMesh::unit_quad());

        let request = CheckRequest::new(["open_edges"], [quad]).unwrap();
        let result = CheckRunner::new(&scene).run(&request).unwrap();
        let open = result.get("open_edges").unwrap();

        assert_eq!(open.nodes(), vec![quad]);
        assert!(open.violations().all(|v| v.node != shape && v.kind == ElementKind::Edge));
    }

    #[test]
    fn skipped_faces_become_warnings() {
        let mut scene = InMemoryScene::new();
        let mut mesh = PolyMesh::unit_quad();
        mesh.faces.push(mesh_types::Polygon::new(vec![0, 2, 1]));
        let (node, _) = scene.add_mesh_object("quad", None, mesh);

        let request = CheckRequest::new(["cross_border"], [node]).unwrap();
        let result = CheckRunner::new(&scene).run(&request).unwrap();
        let cross = result.get("cross_border").unwrap();

        // The mapped unit square reaches into tile 1.
        assert_eq!(cross.by_node()[&node], vec![0]);
        assert_eq!(cross.diagnostics().len(), 1);
        assert_eq!(cross.diagnostics()[0].element, Some(1));
        assert_eq!(cross.status(), RuleStatus::Failed);
    }

    #[test]
    fn invalid_params_reject_run() {
        let mut scene = InMemoryScene::new();
        let node = scene.add_transform("a", None);
        let request = CheckRequest::new(["layers"], [node]).unwrap();
        let runner = CheckRunner::new(&scene)
            .with_params(CheckParams::default().with_border_tolerance(-1.0));

        assert!(matches!(
            runner.run(&request),
            Err(CheckError::InvalidParams { .. })
        ));
    }

    #[test]
    fn cancelled_run_returns_error() {
        let mut scene = InMemoryScene::new();
        let node = scene.add_transform("a", None);
        let request = CheckRequest::new(["layers"], [node]).unwrap();

        let flag = Arc::new(AtomicBool::new(true));
        let runner = CheckRunner::new(&scene).with_cancel_flag(Arc::clone(&flag));
        assert!(matches!(runner.run(&request), Err(CheckError::Cancelled)));
        assert!(matches!(
            runner.run_parallel(&request),
            Err(CheckError::Cancelled)
        ));

        flag.store(false, Ordering::Relaxed);
        assert!(runner.run(&request).is_ok());
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut scene = InMemoryScene::new();
        let mut nodes = Vec::new();
        for i in 0..8 {
            let (node, _) = scene.add_mesh_object(&format!("part{i}"), None, PolyMesh::unit_cube());
            nodes.push(node);
        }
        nodes.push(NodeId::new_v4());

        let request = CheckRequest::all_rules(nodes).unwrap();
        let runner = CheckRunner::new(&scene);
        assert_eq!(runner.run(&request).unwrap(), runner.run_parallel(&request).unwrap());
    }
}
