//! Script statements.

use vela_diagnostic::ErrorCode;
use vela_ir::ast::{
    Assignment, ExprKind, MemberDecl, MemberKind, ModuleDecl, Script, UsingDecl, VarDecl,
};
use vela_ir::{Literal, QualifiedName, Span, TokenKind, VersionNumber};

use crate::{ParseError, ParseOptions, Parser};

impl Parser<'_> {
    /// `Using* Module* Var* Assignment* Expr?`
    pub(crate) fn parse_script(&mut self, options: ParseOptions) -> Result<Script, ParseError> {
        let mut usings = Vec::new();
        while self.cursor.check(&TokenKind::Using) {
            usings.push(self.parse_using().map_err(|e| e.in_context("a using clause"))?);
        }

        let mut modules = Vec::new();
        while self.cursor.check(&TokenKind::Module) {
            modules.push(
                self.parse_module()
                    .map_err(|e| e.in_context("a module declaration"))?,
            );
        }

        let mut vars = Vec::new();
        while self.cursor.check(&TokenKind::Var) {
            vars.push(self.parse_var().map_err(|e| e.in_context("a variable declaration"))?);
        }

        let mut assignments = Vec::new();
        while let Some(assignment) = self.try_parse_assignment()? {
            assignments.push(assignment);
        }

        let body = if self.cursor.is_at_end() {
            None
        } else {
            Some(self.parse_expr()?)
        };

        if options.strict && !self.cursor.is_at_end() {
            return Err(self.trailing_input());
        }

        Ok(Script {
            usings,
            modules,
            vars,
            assignments,
            body,
            arena: std::mem::take(&mut self.arena),
        })
    }

    /// `Module*` followed by end of input.
    pub(crate) fn parse_module_list(&mut self) -> Result<Vec<ModuleDecl>, ParseError> {
        let mut modules = Vec::new();
        while !self.cursor.is_at_end() {
            if !self.cursor.check(&TokenKind::Module) {
                return Err(self.cursor.unexpected("`module`"));
            }
            modules.push(
                self.parse_module()
                    .map_err(|e| e.in_context("a module declaration"))?,
            );
        }
        Ok(modules)
    }

    /// `using [alias :=] Qualified\Name [version]`
    fn parse_using(&mut self) -> Result<UsingDecl, ParseError> {
        let start = self.cursor.expect(&TokenKind::Using)?.span;
        let alias = if self.cursor.check_ident()
            && matches!(self.cursor.peek_kind(1), TokenKind::ColonEq)
        {
            let alias = self.cursor.expect_ident()?;
            self.cursor.advance();
            Some(alias)
        } else {
            None
        };
        let (target, _) = self.parse_qualified_name()?;
        let version = if matches!(self.cursor.current_kind(), TokenKind::Literal(_)) {
            Some(self.parse_version()?)
        } else {
            None
        };
        Ok(UsingDecl {
            alias,
            target,
            version,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `module Name version { member* }`
    fn parse_module(&mut self) -> Result<ModuleDecl, ParseError> {
        let start = self.cursor.expect(&TokenKind::Module)?.span;
        let (name, _) = self.parse_qualified_name()?;
        let version = self.parse_version()?;
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(self.cursor.unexpected("`}`"));
            }
            members.push(self.parse_member()?);
            self.cursor.eat(&TokenKind::Comma);
        }
        self.cursor.advance();
        Ok(ModuleDecl {
            name,
            version,
            members,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `name : typedef T | enum {..} | const E | (params) .. | T`
    fn parse_member(&mut self) -> Result<MemberDecl, ParseError> {
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::Colon)?;
        let kind = match self.cursor.current_kind() {
            TokenKind::Typedef => {
                self.cursor.advance();
                MemberKind::Typedef(self.parse_type()?)
            }
            TokenKind::Enum => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::LBrace)?;
                let mut values = Vec::new();
                while !self.cursor.eat(&TokenKind::RBrace) {
                    values.push(self.cursor.expect_ident()?);
                    self.cursor.eat(&TokenKind::Comma);
                }
                MemberKind::Enum(values)
            }
            TokenKind::Const => {
                self.cursor.advance();
                MemberKind::Const(self.parse_expr()?)
            }
            TokenKind::LParen if self.at_function_selector() => {
                let start = self.cursor.current_span();
                let func = self.parse_function_selector()?;
                MemberKind::Function(self.alloc(ExprKind::Function(Box::new(func)), start))
            }
            _ => MemberKind::Variable(self.parse_type()?),
        };
        Ok(MemberDecl {
            name,
            kind,
            span: name.span.merge(self.cursor.previous_span()),
        })
    }

    /// `var name [: T] [:= E]`
    fn parse_var(&mut self) -> Result<VarDecl, ParseError> {
        let start = self.cursor.expect(&TokenKind::Var)?.span;
        let name = self.cursor.expect_ident()?;
        let ty = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.cursor.eat(&TokenKind::ColonEq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        if ty.is_none() && init.is_none() {
            return Err(ParseError::new(
                ErrorCode::E1004,
                "a variable needs a type or an initializer",
                name.span,
            ));
        }
        Ok(VarDecl {
            name,
            ty,
            init,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `Target := E`, recognised by lookahead so a body starting with an
    /// identifier is left alone.
    fn try_parse_assignment(&mut self) -> Result<Option<Assignment>, ParseError> {
        if !(self.cursor.check_ident() || self.cursor.check(&TokenKind::Backslash)) {
            return Ok(None);
        }
        let snapshot = self.cursor.position();
        let Ok((target, target_span)) = self.parse_qualified_name() else {
            self.cursor.set_position(snapshot);
            return Ok(None);
        };
        if !self.cursor.eat(&TokenKind::ColonEq) {
            self.cursor.set_position(snapshot);
            return Ok(None);
        }
        let value = self.parse_expr()?;
        Ok(Some(Assignment {
            target,
            target_span,
            value,
            span: target_span.merge(self.span_of(value)),
        }))
    }

    /// `[\] ident (\ ident)*`
    pub(crate) fn parse_qualified_name(&mut self) -> Result<(QualifiedName, Span), ParseError> {
        let start = self.cursor.current_span();
        let rooted = self.cursor.eat(&TokenKind::Backslash);
        let mut components = vec![self.cursor.expect_ident()?.name];
        while self.cursor.check(&TokenKind::Backslash)
            && matches!(self.cursor.peek_kind(1), TokenKind::Ident(_))
        {
            self.cursor.advance();
            components.push(self.cursor.expect_ident()?.name);
        }
        Ok((
            QualifiedName::new(components, rooted),
            start.merge(self.cursor.previous_span()),
        ))
    }

    /// A version written as `2`, `2.1` or `2.1.0[.0]`.
    ///
    /// `2.1` lexes as a double, so the version is re-read from the token's
    /// source text.
    fn parse_version(&mut self) -> Result<VersionNumber, ParseError> {
        let token = self.cursor.current();
        let parsed = match token.kind {
            TokenKind::Literal(Literal::Version(v)) => Some(v),
            TokenKind::Literal(Literal::Integer(_) | Literal::Double(_)) => {
                VersionNumber::parse(token.span.slice(self.source))
            }
            _ => return Err(self.cursor.unexpected("a version number")),
        };
        match parsed {
            Some(version) => {
                self.cursor.advance();
                Ok(version)
            }
            None => Err(ParseError::new(
                ErrorCode::E1006,
                format!("`{}` is not a version number", token.span.slice(self.source)),
                token.span,
            )),
        }
    }
}
