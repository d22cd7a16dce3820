//! Textual LLVM IR

use crate::{Function, Global, Instruction, Module, Terminator, Type, Value, ValueKind};
use std::fmt::{self, Write as _};

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "source_filename = \"{}\"", escape_string(&self.name))?;

        let mut declarations = self.declarations().peekable();
        if declarations.peek().is_some() {
            writeln!(f)?;
        }
        for function in declarations {
            writeln!(f, "{function}")?;
        }

        if !self.globals.is_empty() {
            writeln!(f)?;
        }
        for global in &self.globals {
            writeln!(f, "{global}")?;
        }

        for function in self.definitions() {
            writeln!(f)?;
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = private constant {}",
            symbol('@', &self.name),
            Typed(&self.init)
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let name = symbol('@', &self.name);

        if self.is_declaration() {
            return write!(f, "declare {} {name}({params})", self.ret);
        }

        writeln!(f, "define {} {name}({params}) {{", self.ret)?;
        for (idx, block) in self.blocks.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", label(&block.name))?;
            for instruction in &block.instructions {
                writeln!(f, "  {instruction}")?;
            }
            match &block.terminator {
                Some(terminator) => writeln!(f, "  {}", self.terminator(terminator))?,
                None => writeln!(f, "  unreachable")?,
            }
        }
        writeln!(f, "}}")
    }
}

impl Function {
    fn terminator(&self, terminator: &Terminator) -> String {
        let target = |id: &crate::BlockId| symbol('%', &self.blocks[id.0].name);
        match terminator {
            Terminator::Br(block) => format!("br label {}", target(block)),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => format!(
                "br {}, label {}, label {}",
                Typed(cond),
                target(then_block),
                target(else_block)
            ),
            Terminator::Ret(value) => format!("ret {}", Typed(value)),
            Terminator::RetVoid => "ret void".to_owned(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloca { result, ty } => write!(f, "{} = alloca {ty}", symbol('%', result)),
            Self::Load {
                result,
                ty,
                address,
            } => write!(f, "{} = load {ty}, {}", symbol('%', result), Typed(address)),
            Self::Store { value, address } => {
                write!(f, "store {}, {}", Typed(value), Typed(address))
            }
            Self::Add { result, lhs, rhs } => write!(
                f,
                "{} = add {}, {}",
                symbol('%', result),
                Typed(lhs),
                Operand(rhs)
            ),
            Self::Sub { result, lhs, rhs } => write!(
                f,
                "{} = sub {}, {}",
                symbol('%', result),
                Typed(lhs),
                Operand(rhs)
            ),
            Self::ICmp {
                result,
                predicate,
                lhs,
                rhs,
            } => write!(
                f,
                "{} = icmp {} {}, {}",
                symbol('%', result),
                predicate.mnemonic(),
                Typed(lhs),
                Operand(rhs)
            ),
            Self::GetElementPtr {
                result,
                source,
                base,
                indices,
            } => {
                write!(f, "{} = getelementptr {source}, {}", symbol('%', result), Typed(base))?;
                for index in indices {
                    write!(f, ", {}", Typed(index))?;
                }
                Ok(())
            }
            Self::Call {
                result,
                callee,
                args,
            } => {
                if let Some(result) = result {
                    write!(f, "{} = ", symbol('%', result))?;
                }
                let args = args
                    .iter()
                    .map(|arg| Typed(arg).to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "call {} {}({args})", callee.ret, symbol('@', &callee.name))
            }
        }
    }
}

/// Operand without its type: `5`, `%x-2`, `@s-1`, `c"hi\00"`
struct Operand<'a>(&'a Value);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            ValueKind::ConstInt(value) => {
                if self.0.ty == Type::i1() {
                    f.write_str(if *value == 0 { "false" } else { "true" })
                } else {
                    write!(f, "{value}")
                }
            }
            ValueKind::ConstBytes(bytes) => write!(f, "c\"{}\"", escape_bytes(bytes)),
            ValueKind::Local(name) => f.write_str(&symbol('%', name)),
            ValueKind::Global(name) => f.write_str(&symbol('@', name)),
        }
    }
}

/// Operand with its type: `i32 5`, `ptr %x-2`
struct Typed<'a>(&'a Value);

impl fmt::Display for Typed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.ty, Operand(self.0))
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let head = |ch: char| ch.is_ascii_alphabetic() || matches!(ch, '-' | '$' | '.' | '_');
    chars.next().is_some_and(head) && chars.all(|ch| head(ch) || ch.is_ascii_digit())
}

/// `%name`/`@name`, quoted when the name is not a bare identifier
fn symbol(sigil: char, name: &str) -> String {
    if is_bare_identifier(name) {
        format!("{sigil}{name}")
    } else {
        format!("{sigil}\"{}\"", escape_string(name))
    }
}

/// Block label at its definition site
fn label(name: &str) -> String {
    if is_bare_identifier(name) {
        name.to_owned()
    } else {
        format!("\"{}\"", escape_string(name))
    }
}

fn escape_string(text: &str) -> String {
    escape_bytes(text.as_bytes())
}

fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        if (byte.is_ascii_graphic() && byte != b'"' && byte != b'\\') || byte == b' ' {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "\\{byte:02X}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Builder, IntPredicate};

    #[test]
    fn identifiers_with_dashes_print_bare() {
        assert_eq!(symbol('%', "x-2"), "%x-2");
        assert_eq!(symbol('%', ".3"), "%.3");
        assert_eq!(symbol('@', "print_int"), "@print_int");
        assert_eq!(symbol('%', "2x"), "%\"2x\"");
        assert_eq!(symbol('%', "a b"), "%\"a b\"");
    }

    #[test]
    fn byte_strings_escape_non_printables() {
        assert_eq!(escape_bytes(b"hi\n\0"), "hi\\0A\\00");
        assert_eq!(escape_bytes(b"say \"x\\\""), "say \\22x\\5C\\22");
    }

    #[test]
    fn prints_a_small_module() {
        let mut builder = Builder::new(Module::new("demo"));
        let print = builder.declare_function("print_int", Type::Void, vec![Type::i32()]);
        let answer = builder.add_global("answer-1", Value::i32(42));
        builder.add_global("greeting-1", Value::bytes(b"hi\0".to_vec()));

        let main = builder.define_function("main", Type::i32(), Vec::new());
        let entry = builder.append_block(main, "entry").unwrap();
        let done = builder.append_block(main, "done").unwrap();
        builder.position_at_end(main, entry);
        let slot = builder.alloca(Type::i32(), "x-2").unwrap();
        let loaded = builder.load(Type::i32(), answer, "answer-1").unwrap();
        builder.store(loaded, slot.clone()).unwrap();
        let x = builder.load(Type::i32(), slot, "x-2").unwrap();
        let cmp = builder
            .icmp_signed(IntPredicate::Slt, x.clone(), Value::i32(5))
            .unwrap();
        builder.cond_br(cmp, done, done).unwrap();
        builder.position_at_end(main, done);
        builder.call(&print, vec![x.clone()]).unwrap();
        builder.ret(x).unwrap();

        let expected = "\
; ModuleID = 'demo'
source_filename = \"demo\"

declare void @print_int(i32)

@answer-1 = private constant i32 42
@greeting-1 = private constant [3 x i8] c\"hi\\00\"

define i32 @main() {
entry:
  %x-2 = alloca i32
  %answer-1 = load i32, ptr @answer-1
  store i32 %answer-1, ptr %x-2
  %x-2.1 = load i32, ptr %x-2
  %.1 = icmp slt i32 %x-2.1, 5
  br i1 %.1, label %done, label %done

done:
  call void @print_int(i32 %x-2.1)
  ret i32 %x-2.1
}
";
        assert_eq!(builder.finish().to_string(), expected);
    }
}
