//! Resolution of written types to [`Type`]s.

use std::sync::Arc;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{KeyDecl, MemberKind, ParsedTypeId, ParsedTypeKind, RefDecl, TupleTypeDecl};
use vela_ir::Span;
use vela_plan::{MemberRef, SymbolKind};
use vela_stack::ensure_sufficient_stack;
use vela_types::{Attribute, EnumType, Key, Reference, TupleError, TupleType, Type};

use crate::lower::{internal, Compiler};

impl Compiler<'_> {
    pub(crate) fn resolve_type(&mut self, id: ParsedTypeId) -> Result<Type, Diagnostic> {
        ensure_sufficient_stack(|| self.resolve_type_inner(id))
    }

    fn resolve_type_inner(&mut self, id: ParsedTypeId) -> Result<Type, Diagnostic> {
        let arena = self.arena;
        let parsed = arena.ty(id);
        match &parsed.kind {
            ParsedTypeKind::Named(name) => {
                let plan = self.plan;
                let symbol = plan.type_symbol(id).ok_or_else(|| {
                    internal(format!("type `{}` was not resolved", name.display(self.interner)))
                })?;
                match &plan.symbol(symbol).kind {
                    SymbolKind::Scalar(ty) => Ok(ty.clone()),
                    SymbolKind::Member(member) => self.member_type(*member, parsed.span),
                    _ => Err(internal(format!(
                        "`{}` is not a type",
                        name.display(self.interner)
                    ))),
                }
            }
            ParsedTypeKind::Set(inner) => Ok(Type::set(self.resolve_type(*inner)?)),
            ParsedTypeKind::List(inner) => Ok(Type::list(self.resolve_type(*inner)?)),
            ParsedTypeKind::Optional(inner) => Ok(Type::optional(self.resolve_type(*inner)?)),
            ParsedTypeKind::Tuple(decl) => self.tuple_type(decl, parsed.span),
            ParsedTypeKind::Function { params, ret } => {
                let params = params
                    .iter()
                    .map(|&param| self.resolve_type(param))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Type::function(params, self.resolve_type(*ret)?))
            }
        }
    }

    fn tuple_type(&mut self, decl: &TupleTypeDecl, span: Span) -> Result<Type, Diagnostic> {
        let mut attrs = Vec::with_capacity(decl.attrs.len());
        for attr in &decl.attrs {
            attrs.push(Attribute {
                name: self.interner.lookup(attr.name.name),
                ty: self.resolve_type(attr.ty)?,
            });
        }
        let (keys, refs) = self.keys_and_refs(&decl.keys, &decl.refs);
        let tuple = TupleType::new(attrs, keys, refs).map_err(|e| tuple_error(&e, span))?;
        Ok(Type::Tuple(Arc::new(tuple)))
    }

    pub(crate) fn keys_and_refs(
        &self,
        keys: &[KeyDecl],
        refs: &[RefDecl],
    ) -> (Vec<Key>, Vec<Reference>) {
        let names = |idents: &[vela_ir::ast::Ident]| {
            idents
                .iter()
                .map(|ident| self.interner.lookup(ident.name))
                .collect::<Vec<_>>()
        };
        let keys = keys.iter().map(|key| Key::new(names(&key.attrs))).collect();
        let refs = refs
            .iter()
            .map(|r| Reference {
                name: self.interner.lookup(r.name.name),
                source: names(&r.source),
                target: r.target.display(self.interner).into(),
                target_attrs: names(&r.target_attrs),
            })
            .collect();
        (keys, refs)
    }

    /// The type a typedef or enumeration member stands for.
    pub(crate) fn member_type(
        &mut self,
        member: MemberRef,
        span: Span,
    ) -> Result<Type, Diagnostic> {
        match self.member_types.get(&member) {
            Some(Some(ty)) => return Ok(ty.clone()),
            Some(None) => {
                return Err(Diagnostic::error(ErrorCode::E3003)
                    .with_message(format!(
                        "type `{}` is defined in terms of itself",
                        self.member_name(member)
                    ))
                    .with_label(span, "cycle passes through here"));
            }
            None => {}
        }
        self.member_types.insert(member, None);
        let plan = self.plan;
        let ty = match &plan.member(member).kind {
            MemberKind::Typedef(ty) => self.resolve_type(*ty)?,
            MemberKind::Enum(values) => Type::Enum(Arc::new(EnumType {
                name: self.member_name(member).into(),
                values: values
                    .iter()
                    .map(|value| self.interner.lookup(value.name))
                    .collect(),
            })),
            other => {
                return Err(internal(format!("a {} is not a type", other.describe())));
            }
        };
        self.member_types.insert(member, Some(ty.clone()));
        Ok(ty)
    }
}

pub(crate) fn tuple_error(error: &TupleError, span: Span) -> Diagnostic {
    let code = match error {
        TupleError::DuplicateAttribute(_) => ErrorCode::E2002,
        TupleError::UnknownKeyAttribute(_) => ErrorCode::E2007,
    };
    Diagnostic::error(code)
        .with_message(error.to_string())
        .with_label(span, "in this tuple")
}
