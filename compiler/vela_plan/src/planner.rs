//! The planning walk.
//!
//! One top-down pass over the script. Binding constructs open a frame
//! and register their names; identifier leaves are resolved against the
//! frame chain and the result recorded by node id.

use std::sync::Arc;

use smallvec::SmallVec;
use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{
    Clause, ExprArena, ExprId, ExprKind, FunctionSelector, KeyDecl, MemberKind, ModuleDecl,
    ParsedTypeId, ParsedTypeKind, RefDecl, Script, TupleSelector, TupleTypeDecl,
};
use vela_ir::{Name, QualifiedName, Span, StringInterner};
use vela_runtime::builtins;
use vela_stack::ensure_sufficient_stack;
use vela_types::Type;

use crate::link::{link, ImportTarget, Linked};
use crate::symbol::{role_of, Role};
use crate::{
    Catalog, ClauseBindings, Dependency, ForBinding, Frame, FrameId, FrameKind, MemberRef,
    ModuleId, ModuleInfo, ModuleOrigin, Owner, Plan, Resolved, Symbol, SymbolId, SymbolKind,
};

type PlanResult<T = ()> = Result<T, Diagnostic>;

/// Result of walking the frame chain for a name.
struct Lookup {
    symbol: Option<SymbolId>,
    /// Member frames crossed before the name was found, innermost first.
    scopes: SmallVec<[FrameId; 2]>,
}

struct Planner<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    plan: Plan,
    current: FrameId,
    global: FrameId,
    owner: Owner,
    value: Name,
    index: Name,
}

impl<'a> Planner<'a> {
    fn new(arena: &'a ExprArena, interner: &'a StringInterner) -> Self {
        let mut plan = Plan::default();
        plan.frames.push(Frame::new(None, FrameKind::Global));
        let global = FrameId::new(0);
        Planner {
            arena,
            interner,
            plan,
            current: global,
            global,
            owner: Owner::Script,
            value: interner.intern("value"),
            index: interner.intern("index"),
        }
    }

    fn finish(self) -> Plan {
        self.plan
    }

    fn display(&self, name: &QualifiedName) -> String {
        name.display(self.interner)
    }

    fn push_frame(&mut self, kind: FrameKind, parent: FrameId) -> FrameId {
        let id = FrameId::new(self.plan.frames.len());
        self.plan.frames.push(Frame::new(Some(parent), kind));
        id
    }

    /// Run `f` with a fresh child frame of the current one as current.
    fn with_frame<T>(
        &mut self,
        kind: FrameKind,
        f: impl FnOnce(&mut Self, FrameId) -> PlanResult<T>,
    ) -> PlanResult<T> {
        let frame = self.push_frame(kind, self.current);
        let saved = std::mem::replace(&mut self.current, frame);
        let result = f(self, frame);
        self.current = saved;
        result
    }

    fn new_symbol(
        &mut self,
        name: QualifiedName,
        kind: SymbolKind,
        span: Span,
        frame: FrameId,
        implicit: bool,
    ) -> SymbolId {
        let id = SymbolId::new(self.plan.symbols.len());
        self.plan.symbols.push(Symbol {
            name,
            kind,
            span,
            frame,
            implicit,
        });
        id
    }

    /// Register `name` for `symbol` in `frame`. Rebinding an implicit
    /// name, or the same symbol, is allowed; anything else conflicts.
    fn bind(
        &mut self,
        frame: FrameId,
        name: QualifiedName,
        symbol: SymbolId,
        span: Span,
    ) -> PlanResult {
        let previous = self.plan.frames[frame.index()].insert(name.clone(), symbol);
        let Some(previous) = previous else {
            return Ok(());
        };
        if previous == symbol || self.plan.symbol(previous).implicit {
            return Ok(());
        }
        if self.plan.symbol(symbol).implicit {
            // An explicit binding keeps its name against later implicit ones.
            self.plan.frames[frame.index()].insert(name, previous);
            return Ok(());
        }
        let prior_span = self.plan.symbol(previous).span;
        Err(Diagnostic::error(ErrorCode::E2002)
            .with_message(format!("`{}` is already declared in this scope", self.display(&name)))
            .with_label(span, "declared again here")
            .with_secondary_label(prior_span, "first declared here"))
    }

    /// Declare a local in the current frame.
    fn declare_local(&mut self, name: Name, span: Span, implicit: bool) -> PlanResult<SymbolId> {
        let qualified = QualifiedName::simple(name);
        let frame = self.current;
        let id = self.new_symbol(qualified.clone(), SymbolKind::Local, span, frame, implicit);
        self.bind(frame, qualified, id, span)?;
        Ok(id)
    }

    // Globals and modules

    fn declare_globals(&mut self, linked: &Linked) -> PlanResult {
        for name in Type::SCALAR_NAMES {
            if let Some(ty) = Type::scalar(name) {
                let qualified = QualifiedName::simple(self.interner.intern(name));
                let kind = SymbolKind::Scalar(ty);
                let id = self.new_symbol(qualified.clone(), kind, Span::DUMMY, self.global, false);
                self.bind(self.global, qualified, id, Span::DUMMY)?;
            }
        }

        // One ModuleInfo per linked module that is actually imported.
        let mut module_ids: Vec<Option<ModuleId>> = vec![None; linked.modules.len()];
        for import in &linked.imports {
            match import.target {
                ImportTarget::System => self.declare_system(import.alias)?,
                ImportTarget::Module(index) => {
                    let id = match module_ids[index] {
                        Some(id) => id,
                        None => {
                            let module = &linked.modules[index];
                            let id = self.declare_module(module.decl.clone(), module.origin)?;
                            module_ids[index] = Some(id);
                            id
                        }
                    };
                    if let Some(alias) = import.alias {
                        self.declare_alias(id, alias)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn declare_system(&mut self, alias: Option<Name>) -> PlanResult {
        self.plan.imports_system = true;
        let prefix = QualifiedName::simple(self.interner.intern(builtins::MODULE_NAME));
        for builtin in builtins::table() {
            let Some(id) = builtins::lookup(builtin.name) else {
                continue;
            };
            let path = prefix.child(self.interner.intern(builtin.name));
            let existing = self.plan.frames[self.global.index()].get(&path);
            let symbol = match existing {
                Some(symbol) => symbol,
                None => {
                    let kind = SymbolKind::Builtin(id);
                    self.new_symbol(path.clone(), kind, Span::DUMMY, self.global, false)
                }
            };
            self.bind(self.global, path.clone(), symbol, Span::DUMMY)?;
            if let Some(alias) = alias {
                let aliased = QualifiedName::simple(alias).child(path.last());
                self.bind(self.global, aliased, symbol, Span::DUMMY)?;
            }
        }
        Ok(())
    }

    fn declare_module(&mut self, decl: ModuleDecl, origin: ModuleOrigin) -> PlanResult<ModuleId> {
        let id = ModuleId::new(self.plan.modules.len());
        let frame = self.push_frame(FrameKind::Module(id), self.global);
        let name = decl.name.unrooted();
        let display: Arc<str> = Arc::from(self.display(&name));
        self.plan.modules.push(ModuleInfo {
            name: name.clone(),
            display,
            version: decl.version,
            decl,
            origin,
            frame,
            members: Vec::new(),
        });

        let member_count = self.plan.modules[id.index()].decl.members.len();
        for index in 0..member_count {
            let member = self.plan.modules[id.index()].decl.members[index].clone();
            let reference = MemberRef { module: id, index };
            let path = name.child(member.name.name);
            let kind = SymbolKind::Member(reference);
            let symbol = self.new_symbol(path.clone(), kind, member.name.span, frame, false);
            self.plan.modules[id.index()].members.push(symbol);
            self.bind(frame, QualifiedName::simple(member.name.name), symbol, member.name.span)?;
            self.bind(self.global, path.clone(), symbol, member.name.span)?;

            if let MemberKind::Enum(values) = &member.kind {
                for (ordinal, value) in values.iter().enumerate() {
                    let local = QualifiedName::simple(member.name.name).child(value.name);
                    let full = path.child(value.name);
                    let kind = SymbolKind::EnumValue {
                        member: reference,
                        ordinal: u32::try_from(ordinal).unwrap_or(u32::MAX),
                    };
                    let value_symbol =
                        self.new_symbol(full.clone(), kind, value.span, frame, false);
                    self.bind(frame, local, value_symbol, value.span)?;
                    self.bind(self.global, full, value_symbol, value.span)?;
                }
            }
        }
        tracing::debug!(
            module = %self.plan.modules[id.index()].display,
            members = member_count,
            "module declared"
        );
        Ok(id)
    }

    /// Register `alias\member` for every global path under the module.
    fn declare_alias(&mut self, module: ModuleId, alias: Name) -> PlanResult {
        let name = self.plan.module(module).name.clone();
        let prefix_len = name.len();
        let aliased: Vec<(QualifiedName, SymbolId)> = self
            .plan
            .symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| s.frame == self.plan.module(module).frame && s.name.starts_with(&name))
            .map(|(i, s)| {
                let rest =
                    QualifiedName::new(s.name.components()[prefix_len..].iter().copied(), false);
                (QualifiedName::simple(alias).join(&rest), SymbolId::new(i))
            })
            .collect();
        for (path, symbol) in aliased {
            let span = self.plan.symbol(symbol).span;
            self.bind(self.global, path, symbol, span)?;
        }
        Ok(())
    }

    fn plan_modules(&mut self) -> PlanResult {
        for module in 0..self.plan.modules.len() {
            let id = ModuleId::new(module);
            let info = &self.plan.modules[module];
            let (frame, origin) = (info.frame, info.origin);
            let note = format!(
                "in catalog module `{}` {}; positions refer to the module text",
                info.display, info.version
            );
            let saved = std::mem::replace(&mut self.current, frame);
            let result = self.plan_module_members(id);
            self.current = saved;
            self.owner = Owner::Script;
            result.map_err(|d| match origin {
                ModuleOrigin::Catalog => d.with_note(note),
                ModuleOrigin::Script => d,
            })?;
        }
        Ok(())
    }

    fn plan_module_members(&mut self, module: ModuleId) -> PlanResult {
        let count = self.plan.module(module).decl.members.len();
        for index in 0..count {
            self.owner = Owner::Member(MemberRef { module, index });
            let kind = self.plan.module(module).member(index).kind.clone();
            match kind {
                MemberKind::Typedef(ty) | MemberKind::Variable(ty) => self.plan_type(ty)?,
                MemberKind::Enum(_) => {}
                MemberKind::Const(expr) | MemberKind::Function(expr) => self.plan_expr(expr)?,
            }
        }
        Ok(())
    }

    // Script statements

    fn plan_script(&mut self, script: &Script) -> PlanResult {
        let frame = self.push_frame(FrameKind::Script, self.global);
        self.current = frame;
        self.owner = Owner::Script;

        for (i, var) in script.vars.iter().enumerate() {
            if let Some(ty) = var.ty {
                self.plan_type(ty)?;
            }
            if let Some(init) = var.init {
                self.plan_expr(init)?;
            }
            let name = QualifiedName::simple(var.name.name);
            let kind = SymbolKind::ScriptVar(i);
            let id = self.new_symbol(name.clone(), kind, var.name.span, frame, false);
            self.bind(frame, name, id, var.name.span)?;
            self.plan.script_vars.push(id);
        }

        for assignment in &script.assignments {
            let lookup = self.lookup(&assignment.target, assignment.target_span)?;
            let Some(symbol) = lookup.symbol else {
                return Err(self.unknown(&assignment.target, assignment.target_span));
            };
            let assignable = match &self.plan.symbol(symbol).kind {
                SymbolKind::ScriptVar(_) => true,
                SymbolKind::Member(m) => {
                    matches!(self.plan.member(*m).kind, MemberKind::Variable(_))
                }
                _ => false,
            };
            if !assignable {
                return Err(Diagnostic::error(ErrorCode::E3010)
                    .with_message(format!(
                        "`{}` cannot be assigned; only variables can",
                        self.display(&assignment.target)
                    ))
                    .with_label(assignment.target_span, "not a variable"));
            }
            self.record_dependency(symbol, assignment.target_span);
            self.plan.assignments.push(symbol);
            self.plan_expr(assignment.value)?;
        }

        if let Some(body) = script.body {
            self.plan_expr(body)?;
        }
        Ok(())
    }

    // Lookup

    fn lookup(&self, name: &QualifiedName, span: Span) -> PlanResult<Lookup> {
        let mut scopes = SmallVec::new();
        if name.is_rooted() {
            let symbol = self.plan.frame(self.global).get(&name.unrooted());
            return Ok(Lookup { symbol, scopes });
        }
        let simple = name.as_simple().is_some();
        let mut frame = Some(self.current);
        while let Some(id) = frame {
            let current = self.plan.frame(id);
            match current.kind {
                FrameKind::Member => {
                    if simple {
                        scopes.push(id);
                    }
                }
                FrameKind::Global => {
                    let symbol = self.lookup_global(name, span)?;
                    return Ok(Lookup { symbol, scopes });
                }
                _ => {
                    if let Some(symbol) = current.get(name) {
                        return Ok(Lookup {
                            symbol: Some(symbol),
                            scopes,
                        });
                    }
                }
            }
            frame = current.parent;
        }
        Ok(Lookup { symbol: None, scopes })
    }

    /// Exact match first, then the unique imported name ending with `name`.
    fn lookup_global(&self, name: &QualifiedName, span: Span) -> PlanResult<Option<SymbolId>> {
        let global = self.plan.frame(self.global);
        if let Some(symbol) = global.get(name) {
            return Ok(Some(symbol));
        }
        let candidates = global.suffix_matches(name);
        match candidates.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            many => {
                let mut diag = Diagnostic::error(ErrorCode::E3007)
                    .with_message(format!("`{}` is ambiguous", self.display(name)))
                    .with_label(span, "could refer to more than one member");
                for candidate in many {
                    diag = diag.with_note(format!(
                        "candidate: `{}`",
                        self.display(&self.plan.symbol(*candidate).name)
                    ));
                }
                Err(diag.with_note("qualify the name further to pick one"))
            }
        }
    }

    fn role(&self, symbol: SymbolId) -> Option<Role> {
        let kind = &self.plan.symbol(symbol).kind;
        let member_kind = match kind {
            SymbolKind::Member(m) => Some(&self.plan.member(*m).kind),
            _ => None,
        };
        role_of(kind, member_kind)
    }

    fn unknown(&self, name: &QualifiedName, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E2001)
            .with_message(format!("unknown identifier `{}`", self.display(name)))
            .with_label(span, "not found in this scope")
    }

    fn wrong_role(&self, name: &QualifiedName, span: Span, wanted: Role) -> Diagnostic {
        Diagnostic::error(ErrorCode::E2004)
            .with_message(format!("`{}` is not {}", self.display(name), wanted.describe()))
            .with_label(span, format!("expected {}", wanted.describe()))
    }

    fn record_dependency(&mut self, symbol: SymbolId, span: Span) {
        let member = match self.plan.symbol(symbol).kind {
            SymbolKind::Member(member) | SymbolKind::EnumValue { member, .. } => member,
            _ => return,
        };
        let deps = self.plan.deps.entry(self.owner).or_default();
        if !deps.iter().any(|d| d.member == member) {
            deps.push(Dependency { member, span });
        }
    }

    fn resolve_value(&mut self, expr: ExprId, name: &QualifiedName, span: Span) -> PlanResult {
        let Lookup { symbol, scopes } = self.lookup(name, span)?;
        let symbol = match symbol {
            Some(s) if self.role(s) == Some(Role::Value) => Some(s),
            Some(_) if scopes.is_empty() => return Err(self.wrong_role(name, span, Role::Value)),
            _ => None,
        };
        let resolved = match (symbol, scopes.is_empty()) {
            (Some(symbol), true) => Resolved::Symbol(symbol),
            (fallback, false) => Resolved::Member { scopes, fallback },
            (None, true) => return Err(self.unknown(name, span)),
        };
        if let Some(symbol) = symbol {
            self.record_dependency(symbol, span);
        }
        self.plan.resolutions.insert(expr, resolved);
        Ok(())
    }

    // Types

    fn plan_type(&mut self, id: ParsedTypeId) -> PlanResult {
        let arena = self.arena;
        let ty = arena.ty(id);
        match &ty.kind {
            ParsedTypeKind::Named(name) => {
                let Some(symbol) = self.lookup(name, ty.span)?.symbol else {
                    return Err(self.unknown(name, ty.span));
                };
                if self.role(symbol) != Some(Role::Type) {
                    return Err(self.wrong_role(name, ty.span, Role::Type));
                }
                self.record_dependency(symbol, ty.span);
                self.plan.type_names.insert(id, symbol);
                Ok(())
            }
            ParsedTypeKind::Set(inner)
            | ParsedTypeKind::List(inner)
            | ParsedTypeKind::Optional(inner) => self.plan_type(*inner),
            ParsedTypeKind::Tuple(decl) => self.plan_tuple_type(decl),
            ParsedTypeKind::Function { params, ret } => {
                for param in params {
                    self.plan_type(*param)?;
                }
                self.plan_type(*ret)
            }
        }
    }

    fn plan_tuple_type(&mut self, decl: &TupleTypeDecl) -> PlanResult {
        for attr in &decl.attrs {
            self.plan_type(attr.ty)?;
        }
        for reference in &decl.refs {
            self.plan_ref_target(reference)?;
        }
        self.with_frame(FrameKind::TupleType, |p, frame| {
            for attr in &decl.attrs {
                let name = QualifiedName::simple(attr.name.name);
                let kind = SymbolKind::Attribute;
                let id = p.new_symbol(name.clone(), kind, attr.name.span, frame, false);
                p.bind(frame, name, id, attr.name.span)?;
            }
            let known = |p: &Self, name: Name| {
                p.plan.frame(frame).get(&QualifiedName::simple(name)).is_some()
            };
            p.check_key_attrs(&decl.keys, &decl.refs, known)
        })
    }

    fn check_key_attrs(
        &self,
        keys: &[KeyDecl],
        refs: &[RefDecl],
        known: impl Fn(&Self, Name) -> bool,
    ) -> PlanResult {
        let named = keys
            .iter()
            .flat_map(|k| &k.attrs)
            .chain(refs.iter().flat_map(|r| &r.source));
        for ident in named {
            if !known(self, ident.name) {
                return Err(Diagnostic::error(ErrorCode::E2007)
                    .with_message(format!(
                        "`{}` is not an attribute of this tuple",
                        self.interner.lookup(ident.name)
                    ))
                    .with_label(ident.span, "undeclared attribute"));
            }
        }
        Ok(())
    }

    /// A reference's target must name a value, usually a module variable.
    fn plan_ref_target(&mut self, reference: &RefDecl) -> PlanResult {
        let Some(symbol) = self.lookup(&reference.target, reference.target_span)?.symbol else {
            return Err(self.unknown(&reference.target, reference.target_span));
        };
        if self.role(symbol) != Some(Role::Value) {
            return Err(self.wrong_role(&reference.target, reference.target_span, Role::Value));
        }
        self.record_dependency(symbol, reference.target_span);
        Ok(())
    }

    // Expressions

    fn plan_expr(&mut self, id: ExprId) -> PlanResult {
        ensure_sufficient_stack(|| self.plan_expr_inner(id))
    }

    fn plan_expr_inner(&mut self, id: ExprId) -> PlanResult {
        let arena = self.arena;
        let expr = arena.get(id);
        match &expr.kind {
            ExprKind::Literal(_) | ExprKind::Null => Ok(()),
            ExprKind::Ident(name) => self.resolve_value(id, name, expr.span),
            ExprKind::Deref { target, member } => {
                self.plan_expr(*target)?;
                self.with_frame(FrameKind::Member, |p, frame| {
                    p.plan.member_frames.insert(id, frame);
                    p.plan_expr(*member)
                })
            }
            ExprKind::Call {
                callee,
                type_args,
                args,
            } => {
                self.plan_expr(*callee)?;
                for ty in type_args {
                    self.plan_type(*ty)?;
                }
                let args = arena.list(*args);
                match args {
                    // May turn out to be a restriction once the callee is typed.
                    [only] if type_args.is_empty() => {
                        self.with_frame(FrameKind::Member, |p, frame| {
                            p.plan.member_frames.insert(id, frame);
                            p.plan_expr(*only)
                        })
                    }
                    _ => args.iter().try_for_each(|arg| self.plan_expr(*arg)),
                }
            }
            ExprKind::Tuple(selector) => self.plan_tuple_selector(selector),
            ExprKind::Function(func) => self.plan_function(id, func),
            ExprKind::Clause(clause) => self.plan_clause(id, clause),
            ExprKind::Binary { .. }
            | ExprKind::Unary { .. }
            | ExprKind::Index { .. }
            | ExprKind::List(_)
            | ExprKind::Set(_)
            | ExprKind::If { .. }
            | ExprKind::Case(_)
            | ExprKind::Try { .. } => arena
                .children(id)
                .into_iter()
                .try_for_each(|child| self.plan_expr(child)),
        }
    }

    fn plan_tuple_selector(&mut self, selector: &TupleSelector) -> PlanResult {
        let mut names: Vec<(Name, Span)> = Vec::with_capacity(selector.attrs.len());
        for attr in &selector.attrs {
            self.plan_expr(attr.value)?;
            let name = match attr.name {
                Some(ident) => Some(ident.name),
                None => match &self.arena.get(attr.value).kind {
                    ExprKind::Ident(q) => Some(q.last()),
                    _ => None,
                },
            };
            let Some(name) = name else { continue };
            if let Some((_, first)) = names.iter().find(|(n, _)| *n == name) {
                return Err(Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "attribute `{}` is given more than once",
                        self.interner.lookup(name)
                    ))
                    .with_label(attr.span, "given again here")
                    .with_secondary_label(*first, "first given here"));
            }
            names.push((name, attr.span));
        }
        for reference in &selector.refs {
            self.plan_ref_target(reference)?;
        }
        self.check_key_attrs(&selector.keys, &selector.refs, |_, name| {
            names.iter().any(|(n, _)| *n == name)
        })
    }

    fn plan_function(&mut self, id: ExprId, func: &FunctionSelector) -> PlanResult {
        for param in &func.params {
            self.plan_type(param.ty)?;
        }
        if let Some(ret) = func.ret {
            self.plan_type(ret)?;
        }
        self.with_frame(FrameKind::Function, |p, _| {
            let mut symbols = Vec::with_capacity(func.params.len());
            for param in &func.params {
                symbols.push(p.declare_local(param.name.name, param.name.span, false)?);
            }
            p.plan.params.insert(id, symbols);
            p.plan_expr(func.body)
        })
    }

    fn plan_clause(&mut self, id: ExprId, clause: &Clause) -> PlanResult {
        self.with_frame(FrameKind::Clause, |p, frame| {
            let mut fors = Vec::with_capacity(clause.fors.len());
            for item in &clause.fors {
                p.plan_expr(item.source)?;
                let value = p.declare_local(p.value, item.var.span, true)?;
                let index = p.declare_local(p.index, item.var.span, true)?;
                let var = p.declare_local(item.var.name, item.var.span, false)?;
                fors.push(ForBinding { var, value, index });
            }
            let mut lets = Vec::with_capacity(clause.lets.len());
            for item in &clause.lets {
                p.plan_expr(item.value)?;
                lets.push(p.declare_local(item.var.name, item.var.span, false)?);
            }
            if let Some(filter) = clause.filter {
                p.plan_expr(filter)?;
            }
            for dim in &clause.order {
                p.plan_expr(dim.expr)?;
            }
            p.plan_expr(clause.body)?;
            p.plan.clauses.insert(id, ClauseBindings { frame, fors, lets });
            Ok(())
        })
    }
}

/// Resolve every name in `script`.
///
/// Catalog modules the script imports are parsed into `script.arena`
/// first; `default_usings` are imported ahead of the script's own
/// `using` declarations.
#[tracing::instrument(level = "debug", skip_all)]
pub fn plan(
    script: &mut Script,
    catalog: &Catalog,
    interner: &StringInterner,
    default_usings: &[String],
) -> Result<Plan, Diagnostic> {
    let linked = link(script, catalog, interner, default_usings)?;
    let script = &*script;
    let mut planner = Planner::new(&script.arena, interner);
    planner.declare_globals(&linked)?;
    planner.plan_modules()?;
    planner.plan_script(script)?;
    let plan = planner.finish();
    tracing::debug!(
        symbols = plan.symbol_count(),
        frames = plan.frame_count(),
        modules = plan.modules().len(),
        "script planned"
    );
    Ok(plan)
}
